use crate::Location;

/// An expression: a literal, a name, or a derived access/call.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Integer { value: i64, location: Location },
    Float { value: f64, location: Location },
    String { value: String, location: Location },
    Identifier { name: String, location: Location },
    FieldAccess { base: Box<Expr>, field: String, location: Location },
    Index { base: Box<Expr>, index: Box<Expr>, location: Location },
    Call { callee: Box<Expr>, args: Vec<Expr>, location: Location },
}

impl Expr {
    pub fn location(&self) -> &Location {
        match self {
            Expr::Integer { location, .. }
            | Expr::Float { location, .. }
            | Expr::String { location, .. }
            | Expr::Identifier { location, .. }
            | Expr::FieldAccess { location, .. }
            | Expr::Index { location, .. }
            | Expr::Call { location, .. } => location,
        }
    }
}
