pub mod path;
pub mod resolver;
pub mod scanner;

pub use path::{Path, PathParseError, PathPart};
pub use resolver::{resolve, resolve_best_effort, resolve_parts, Position, Unresolved};
pub use scanner::{Token, TokenKind, Tokens};
