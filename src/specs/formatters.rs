//! Syncer for the data object formatter document.
//!
//! ```xml
//! <formatters>
//!   <format name="Agent" title="Agent" class="edu.ku.brc.specify.datamodel.Agent" default="true">
//!     <switch single="true">
//!       <fields>
//!         <field sep=", ">lastName</field>
//!         <field>firstName</field>
//!       </fields>
//!     </switch>
//!   </format>
//!   <aggregators>
//!     <aggregator name="Collectors" title="Collectors" class="edu.ku.brc.specify.datamodel.Collector"
//!       default="true" separator="; " format="Collector"/>
//!   </aggregators>
//! </formatters>
//! ```

use crate::specs::{optional_container, TableRegistry};
use crate::syncer::{
    attribute, boolean, child, children, default_value, each, integer, object, required_attribute,
    table_reference, text, Object, SyncerExt,
};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Formatters {
    pub formats: Vec<Format>,
    pub aggregators: Vec<Aggregator>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Format {
    pub name: String,
    pub title: String,
    pub table: Option<String>,
    pub is_default: bool,
    pub switch: Switch,
}

/// Chooses a field list, optionally by the value of one field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Switch {
    pub is_single: bool,
    pub field: String,
    pub cases: Vec<FieldList>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldList {
    pub value: String,
    pub fields: Vec<FormatField>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormatField {
    pub field: String,
    pub separator: String,
    pub aggregator: String,
    pub format: String,
    pub ui_formatter: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Aggregator {
    pub name: String,
    pub title: String,
    pub table: Option<String>,
    pub is_default: bool,
    pub separator: String,
    pub suffix: String,
    pub limit: i64,
    pub format: String,
    pub sort_field: String,
}

pub fn formatters(tables: &TableRegistry) -> Object<Formatters> {
    object::<Formatters>()
        .field(
            "formats",
            children("format").then(each(format(tables))),
            |v| &v.formats,
            |v, x| v.formats = x,
        )
        .field(
            "aggregators",
            optional_container("aggregators")
                .then(children("aggregator"))
                .then(each(aggregator(tables))),
            |v| &v.aggregators,
            |v, x| v.aggregators = x,
        )
}

pub fn format(tables: &TableRegistry) -> Object<Format> {
    object::<Format>()
        .field("name", required_attribute("name"), |v| &v.name, |v, x| v.name = x)
        .field(
            "title",
            attribute("title").then(default_value("")),
            |v| &v.title,
            |v, x| v.title = x,
        )
        .field(
            "table",
            required_attribute("class").then(table_reference(tables)),
            |v| &v.table,
            |v, x| v.table = x,
        )
        .field(
            "isDefault",
            attribute("default").then(boolean(false)),
            |v| &v.is_default,
            |v, x| v.is_default = x,
        )
        .field("switch", child("switch").then(switch()), |v| &v.switch, |v, x| v.switch = x)
}

fn switch() -> Object<Switch> {
    object::<Switch>()
        .field(
            "isSingle",
            attribute("single").then(boolean(true)),
            |v| &v.is_single,
            |v, x| v.is_single = x,
        )
        .field(
            "field",
            attribute("field").then(default_value("")),
            |v| &v.field,
            |v, x| v.field = x,
        )
        .field(
            "cases",
            children("fields").then(each(field_list())),
            |v| &v.cases,
            |v, x| v.cases = x,
        )
}

fn field_list() -> Object<FieldList> {
    object::<FieldList>()
        .field(
            "value",
            attribute("value").then(default_value("")),
            |v| &v.value,
            |v, x| v.value = x,
        )
        .field(
            "fields",
            children("field").then(each(format_field())),
            |v| &v.fields,
            |v, x| v.fields = x,
        )
}

fn format_field() -> Object<FormatField> {
    object::<FormatField>()
        .field("field", text(), |v| &v.field, |v, x| v.field = x)
        .field(
            "separator",
            attribute("sep").then(default_value("")),
            |v| &v.separator,
            |v, x| v.separator = x,
        )
        .field(
            "aggregator",
            attribute("formatter").then(default_value("")),
            |v| &v.aggregator,
            |v, x| v.aggregator = x,
        )
        .field(
            "format",
            attribute("format").then(default_value("")),
            |v| &v.format,
            |v, x| v.format = x,
        )
        .field(
            "uiFormatter",
            attribute("uifieldformatter").then(default_value("")),
            |v| &v.ui_formatter,
            |v, x| v.ui_formatter = x,
        )
}

pub fn aggregator(tables: &TableRegistry) -> Object<Aggregator> {
    object::<Aggregator>()
        .field("name", required_attribute("name"), |v| &v.name, |v, x| v.name = x)
        .field(
            "title",
            attribute("title").then(default_value("")),
            |v| &v.title,
            |v, x| v.title = x,
        )
        .field(
            "table",
            required_attribute("class").then(table_reference(tables)),
            |v| &v.table,
            |v, x| v.table = x,
        )
        .field(
            "isDefault",
            attribute("default").then(boolean(false)),
            |v| &v.is_default,
            |v, x| v.is_default = x,
        )
        .field(
            "separator",
            attribute("separator").then(default_value("; ")),
            |v| &v.separator,
            |v, x| v.separator = x,
        )
        .field(
            "suffix",
            attribute("ending").then(default_value("")),
            |v| &v.suffix,
            |v, x| v.suffix = x,
        )
        .field(
            "limit",
            attribute("count").then(integer(0)),
            |v| &v.limit,
            |v, x| v.limit = x,
        )
        .field(
            "format",
            attribute("format").then(default_value("")),
            |v| &v.format,
            |v, x| v.format = x,
        )
        .field(
            "sortField",
            attribute("orderfieldname").then(default_value("")),
            |v| &v.sort_field,
            |v, x| v.sort_field = x,
        )
}
