//! Location of a node inside a schema, used in errors and log lines

use std::fmt;

/// Segment of a schema path
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Object property access: .fieldName
    Property(String),
    /// Every element of an array: [*]
    Items,
    /// Hop through a `$ref`: <Name>
    Reference(String),
}

/// Path from the root schema to a node (e.g. "Order.lines[*].product<Product>.sku")
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct SchemaPath {
    segments: Vec<PathSegment>,
}

impl SchemaPath {
    /// Create a root path (empty)
    pub fn root() -> Self {
        Self { segments: vec![] }
    }

    /// Create a path starting at a named schema
    pub fn schema(name: &str) -> Self {
        Self::root().push_property(name)
    }

    /// Number of segments, used as the recursion depth
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn push_property(&self, name: &str) -> Self {
        let mut new = self.clone();
        new.segments.push(PathSegment::Property(name.to_string()));
        new
    }

    pub fn push_items(&self) -> Self {
        let mut new = self.clone();
        new.segments.push(PathSegment::Items);
        new
    }

    pub fn push_reference(&self, name: &str) -> Self {
        let mut new = self.clone();
        new.segments.push(PathSegment::Reference(name.to_string()));
        new
    }
}

impl fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "<root>");
        }
        for (i, seg) in self.segments.iter().enumerate() {
            match seg {
                PathSegment::Property(name) if i == 0 => write!(f, "{}", name)?,
                PathSegment::Property(name) => write!(f, ".{}", name)?,
                PathSegment::Items => write!(f, "[*]")?,
                PathSegment::Reference(name) => write!(f, "<{}>", name)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let path = SchemaPath::schema("Order")
            .push_property("lines")
            .push_items()
            .push_property("product")
            .push_reference("Product")
            .push_property("sku");
        assert_eq!(path.to_string(), "Order.lines[*].product<Product>.sku");
        assert_eq!(path.depth(), 6);
    }

    #[test]
    fn test_root_display() {
        assert_eq!(SchemaPath::root().depth(), 0);
        assert_eq!(SchemaPath::root().to_string(), "<root>");
    }
}
