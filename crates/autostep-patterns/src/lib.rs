//! Token and declaration model for AutoStep step statements.
//!
//! The crate tokenises step reference text, compiles step declarations into
//! ordered word and argument parts, and defines the argument type lattice
//! shared by the linker and its front ends.

mod errors;
mod hint;
mod keyword;
mod pattern;
mod specificity;
mod token;
mod tokenizer;

pub use errors::{PatternError, PlaceholderErrorInfo};
pub use hint::{ArgumentType, parse_type_hint};
pub use keyword::{StepType, StepTypeParseError};
pub use pattern::{ArgumentPart, DeclarationPattern, DefinitionPart, WordPart, compile_declaration};
pub use specificity::SpecificityScore;
pub use token::{StepToken, StepTokenKind, TokenisedText};
pub use tokenizer::tokenise_statement;
