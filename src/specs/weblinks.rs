//! Syncer for the web link definitions document.
//!
//! Unlike the formatter document, values live in element text:
//!
//! ```xml
//! <vector>
//!   <weblinkdef>
//!     <name>GBIF</name>
//!     <tableName>Taxon</tableName>
//!     <desc>Search GBIF</desc>
//!     <baseURLStr>https://www.gbif.org/species/search?q=&lt;fullName&gt;</baseURLStr>
//!     <args>
//!       <weblinkdefarg>
//!         <name>fullName</name>
//!         <title>Full Name</title>
//!         <prompt>false</prompt>
//!       </weblinkdefarg>
//!     </args>
//!   </weblinkdef>
//! </vector>
//! ```

use crate::specs::{child_text, optional_container, TableRegistry};
use crate::syncer::{boolean, children, default_value, each, enumeration, object, Object, SyncerExt};
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WebLinks {
    pub links: Vec<WebLink>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WebLink {
    pub name: String,
    pub table: String,
    pub description: String,
    pub url: String,
    pub parameters: Vec<Parameter>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub name: String,
    pub title: String,
    pub prompt: bool,
}

pub fn web_links(tables: &TableRegistry) -> Object<WebLinks> {
    object::<WebLinks>().field(
        "links",
        children("weblinkdef").then(each(web_link(tables))),
        |v| &v.links,
        |v, x| v.links = x,
    )
}

pub fn web_link(tables: &TableRegistry) -> Object<WebLink> {
    object::<WebLink>()
        .field(
            "name",
            child_text("name").required("Web link name is missing"),
            |v| &v.name,
            |v, x| v.name = x,
        )
        .field(
            "table",
            child_text("tableName")
                .then(default_value(""))
                .then(enumeration(tables.names())),
            |v| &v.table,
            |v, x| v.table = x,
        )
        .field(
            "description",
            child_text("desc").then(default_value("")),
            |v| &v.description,
            |v, x| v.description = x,
        )
        .field(
            "url",
            child_text("baseURLStr").then(default_value("")),
            |v| &v.url,
            |v, x| v.url = x,
        )
        .field(
            "parameters",
            optional_container("args")
                .then(children("weblinkdefarg"))
                .then(each(parameter())),
            |v| &v.parameters,
            |v, x| v.parameters = x,
        )
}

fn parameter() -> Object<Parameter> {
    object::<Parameter>()
        .field(
            "name",
            child_text("name").required("Parameter name is missing"),
            |v| &v.name,
            |v, x| v.name = x,
        )
        .field(
            "title",
            child_text("title").then(default_value("")),
            |v| &v.title,
            |v, x| v.title = x,
        )
        .field(
            "prompt",
            child_text("prompt").then(boolean(false)),
            |v| &v.prompt,
            |v, x| v.prompt = x,
        )
}
