//! Record syncer assembled from named field syncers.

use crate::syncer::context::SyncContext;
use crate::syncer::combinators::Syncer;
use crate::xml::GroupedNode;

trait ObjectField<T> {
    fn name(&self) -> &str;
    fn read_into(&self, node: &GroupedNode, value: &mut T, ctx: &mut SyncContext);
    fn write_from(&self, value: &T, node: GroupedNode) -> GroupedNode;
}

struct Field<T, S: Syncer> {
    name: String,
    syncer: S,
    get: fn(&T) -> &S::Output,
    set: fn(&mut T, S::Output),
}

impl<T, S> ObjectField<T> for Field<T, S>
where
    S: Syncer<Input = GroupedNode>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn read_into(&self, node: &GroupedNode, value: &mut T, ctx: &mut SyncContext) {
        let field = ctx.scoped(|ctx| self.syncer.serialize(node, ctx));
        (self.set)(value, field);
    }

    fn write_from(&self, value: &T, node: GroupedNode) -> GroupedNode {
        self.syncer.deserialize((self.get)(value), &node)
    }
}

/// Reads a `T` field by field; writes each field back into the same node.
///
/// Attributes and children that no field names pass through untouched.
pub struct Object<T> {
    fields: Vec<Box<dyn ObjectField<T>>>,
}

pub fn object<T: Default>() -> Object<T> {
    Object { fields: Vec::new() }
}

impl<T: Default> Object<T> {
    #[must_use]
    pub fn field<S>(
        mut self,
        name: impl Into<String>,
        syncer: S,
        get: fn(&T) -> &S::Output,
        set: fn(&mut T, S::Output),
    ) -> Self
    where
        S: Syncer<Input = GroupedNode> + 'static,
        T: 'static,
    {
        self.fields.push(Box::new(Field {
            name: name.into(),
            syncer,
            get,
            set,
        }));
        self
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name())
    }
}

impl<T: Default> Syncer for Object<T> {
    type Input = GroupedNode;
    type Output = T;

    fn serialize(&self, input: &GroupedNode, ctx: &mut SyncContext) -> T {
        let mut value = T::default();
        for field in &self.fields {
            field.read_into(input, &mut value, ctx);
        }
        value
    }

    fn deserialize(&self, output: &T, previous: &GroupedNode) -> GroupedNode {
        self.fields
            .iter()
            .fold(previous.clone(), |node, field| field.write_from(output, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syncer::combinators::SyncerExt;
    use crate::syncer::values::boolean;
    use crate::syncer::xml::{attribute, required_attribute};
    use crate::xml::{normalize, parse_document};

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Format {
        name: String,
        default: bool,
    }

    fn format() -> Object<Format> {
        object::<Format>()
            .field("name", required_attribute("name"), |f| &f.name, |f, v| f.name = v)
            .field(
                "default",
                attribute("default").then(boolean(false)),
                |f| &f.default,
                |f, v| f.default = v,
            )
    }

    #[test]
    fn test_object_reads_fields() {
        let node = normalize(&parse_document("<format name=\"A\" default=\"true\" x=\"1\"/>").unwrap().root);
        let result = format().read(&node);
        assert_eq!(
            result.value,
            Format {
                name: "A".into(),
                default: true
            }
        );
        assert!(result.diagnostics.is_empty());
        assert_eq!(format().field_names().collect::<Vec<_>>(), vec!["name", "default"]);
    }

    #[test]
    fn test_object_passes_unknown_content_through() {
        let node = normalize(
            &parse_document("<format x=\"1\" name=\"A\"><extra/></format>").unwrap().root,
        );
        let syncer = format();
        let mut value = syncer.read(&node).value;
        assert_eq!(syncer.deserialize(&value, &node), node);

        value.name = "B".into();
        value.default = true;
        let updated = syncer.deserialize(&value, &node);
        let names: Vec<_> = updated.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["x", "name", "default"]);
        assert_eq!(updated.children("extra").len(), 1);
    }

    #[test]
    fn test_object_field_paths_are_scoped() {
        let node = normalize(&parse_document("<format/>").unwrap().root);
        let result = format().read(&node);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].path.to_string(), "/@name");
    }
}
