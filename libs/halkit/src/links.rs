//! Reading type-level link declarations.

use hal_core::{Entity, EntityKind, LinkDeclaration};

/// Link declarations registered for `E`.
///
/// Reads the compile-time table only, so the result is identical on every
/// call and safe to share across threads.
pub fn read_link_declarations<E: EntityKind>() -> &'static [LinkDeclaration] {
    E::LINKS
}

/// Link declarations for a type-erased entity.
pub struct LinkReader;

impl LinkReader {
    pub fn for_entity(entity: &dyn Entity) -> &'static [LinkDeclaration] {
        entity.link_declarations()
    }

    /// Target resource for the relation `name`, if declared.
    pub fn target_of(entity: &dyn Entity, name: &str) -> Option<&'static str> {
        Self::for_entity(entity)
            .iter()
            .find(|decl| decl.name == name)
            .map(|decl| decl.resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hal_core::{EntityId, MetaContributor};
    use serde::Serialize;

    #[derive(Serialize)]
    struct Invoice {
        id: i64,
    }

    impl EntityKind for Invoice {
        const TYPE_NAME: &'static str = "Invoice";
        const LINKS: &'static [LinkDeclaration] = &[
            LinkDeclaration::new("customer", "Customers"),
            LinkDeclaration::new("payments", "Payments"),
        ];

        fn id(&self) -> EntityId {
            self.id.into()
        }
    }

    impl MetaContributor for Invoice {}

    #[derive(Serialize)]
    struct Note;

    impl EntityKind for Note {
        const TYPE_NAME: &'static str = "Note";

        fn id(&self) -> EntityId {
            EntityId::from("note")
        }
    }

    impl MetaContributor for Note {}

    #[test]
    fn reads_declarations_in_order() {
        let decls = read_link_declarations::<Invoice>();
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0], LinkDeclaration::new("customer", "Customers"));
        assert_eq!(decls[1].name, "payments");
    }

    #[test]
    fn stable_across_calls() {
        let a = read_link_declarations::<Invoice>();
        let b = LinkReader::for_entity(&Invoice { id: 1 });
        assert_eq!(a, b);
    }

    #[test]
    fn no_declarations_is_empty() {
        assert!(read_link_declarations::<Note>().is_empty());
        assert!(LinkReader::for_entity(&Note).is_empty());
    }

    #[test]
    fn target_lookup() {
        let inv = Invoice { id: 3 };
        assert_eq!(LinkReader::target_of(&inv, "payments"), Some("Payments"));
        assert_eq!(LinkReader::target_of(&inv, "refunds"), None);
    }
}
