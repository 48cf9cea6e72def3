pub const NS_RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const NS_XSD: &str = "http://www.w3.org/2001/XMLSchema#";

/// Property under which `@type` values are stored in a [`Node`](crate::Node).
pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

pub mod xsd {
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
    pub const ANY_URI: &str = "http://www.w3.org/2001/XMLSchema#anyURI";
}

/// Literal-type hint attached to a term or carried inline by a value object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Coercion {
    /// `@id`: values are resource references.
    Id,
    String,
    Integer,
    Boolean,
    Double,
    AnyUri,
    /// A datatype without a dedicated decode rule. Values pass through.
    Other(String),
}

impl Coercion {
    /// Classify an expanded datatype IRI (or the `@id` keyword).
    pub fn from_iri(iri: &str) -> Self {
        match iri {
            "@id" => Coercion::Id,
            xsd::STRING => Coercion::String,
            xsd::INTEGER => Coercion::Integer,
            xsd::BOOLEAN => Coercion::Boolean,
            xsd::DOUBLE => Coercion::Double,
            xsd::ANY_URI => Coercion::AnyUri,
            other => Coercion::Other(other.to_string()),
        }
    }

    pub fn as_iri(&self) -> &str {
        match self {
            Coercion::Id => "@id",
            Coercion::String => xsd::STRING,
            Coercion::Integer => xsd::INTEGER,
            Coercion::Boolean => xsd::BOOLEAN,
            Coercion::Double => xsd::DOUBLE,
            Coercion::AnyUri => xsd::ANY_URI,
            Coercion::Other(iri) => iri,
        }
    }
}

/// A term binding inside a [`Context`](crate::Context).
///
/// An empty `id` with no coercion means "do not expand this name". An empty
/// `id` with a coercion only contributes the coercion; the name itself is
/// expanded as usual.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermDefinition {
    pub id: String,
    pub coercion: Option<Coercion>,
}

impl TermDefinition {
    pub fn new(id: impl Into<String>) -> Self {
        TermDefinition {
            id: id.into(),
            coercion: None,
        }
    }

    pub fn with_coercion(mut self, coercion: Coercion) -> Self {
        self.coercion = Some(coercion);
        self
    }

    /// Shorthand for a term whose values are resource references.
    pub fn reference(id: impl Into<String>) -> Self {
        Self::new(id).with_coercion(Coercion::Id)
    }

    pub fn declares_id(&self) -> bool {
        self.coercion == Some(Coercion::Id)
    }
}

/// Type witness field of a bound record.
///
/// Receives the node's `@type` on decode and provides it on encode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Type {
    pub iri: String,
}

impl Type {
    pub fn new(iri: impl Into<String>) -> Self {
        Type { iri: iri.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rdf_type_lives_in_rdf_namespace() {
        assert!(RDF_TYPE.starts_with(NS_RDF));
        assert_eq!(&RDF_TYPE[NS_RDF.len()..], "type");
    }

    #[test]
    fn xsd_constants_live_in_xsd_namespace() {
        for iri in [xsd::STRING, xsd::BOOLEAN, xsd::INTEGER, xsd::DOUBLE, xsd::ANY_URI] {
            assert!(iri.starts_with(NS_XSD), "{iri}");
        }
    }

    #[test]
    fn coercion_from_known_iris() {
        assert_eq!(Coercion::from_iri("@id"), Coercion::Id);
        assert_eq!(Coercion::from_iri(xsd::INTEGER), Coercion::Integer);
        assert_eq!(Coercion::from_iri(xsd::ANY_URI), Coercion::AnyUri);
    }

    #[test]
    fn coercion_keeps_unknown_datatypes() {
        let c = Coercion::from_iri("http://www.w3.org/2001/XMLSchema#dateTime");
        assert_eq!(
            c,
            Coercion::Other("http://www.w3.org/2001/XMLSchema#dateTime".to_string())
        );
        assert_eq!(c.as_iri(), "http://www.w3.org/2001/XMLSchema#dateTime");
    }

    #[test]
    fn coercion_iri_round_trips() {
        for c in [
            Coercion::Id,
            Coercion::String,
            Coercion::Integer,
            Coercion::Boolean,
            Coercion::Double,
            Coercion::AnyUri,
        ] {
            assert_eq!(Coercion::from_iri(c.as_iri()), c);
        }
    }

    #[test]
    fn term_definition_reference() {
        let term = TermDefinition::reference("http://schema.org/url");
        assert_eq!(term.id, "http://schema.org/url");
        assert!(term.declares_id());
        assert!(!TermDefinition::new("http://schema.org/name").declares_id());
    }
}
