//! Argument type inference for matched references.

use autostep_patterns::ArgumentType;

use crate::linker::LinkerOptions;
use crate::matching::ArgumentMatch;
use crate::messages::{CompilerMessage, CompilerMessageCode};
use crate::reference::{ArgumentBinding, StepReference, content_range};

/// Bind one matched argument, returning the binding and any diagnostics.
///
/// Single-token values take the token's own type. Values spanning several
/// tokens, or padded with whitespace inside their quotes, are text, unless
/// they contain a variable or interpolation, in which case the type is only
/// known at run time.
pub(crate) fn bind_argument(
    reference: &StepReference,
    matched: &ArgumentMatch,
    options: LinkerOptions,
    source_name: Option<&str>,
) -> (ArgumentBinding, Vec<CompilerMessage>) {
    let text = reference.tokenised();
    let content = content_range(&matched.tokens, matched.start_exclusive, matched.end_exclusive);
    let mut messages = Vec::new();

    let padded_start = matched.start_exclusive
        && !content.is_empty()
        && text.has_gap_after(matched.tokens.start);
    let padded_end = matched.end_exclusive
        && !content.is_empty()
        && content
            .end
            .checked_sub(1)
            .is_some_and(|last| text.has_gap_after(last));

    let raw_text = content
        .end
        .checked_sub(1)
        .filter(|_| !content.is_empty())
        .map(|last| text.slice(content.start, last).to_string())
        .unwrap_or_default();

    let hint = matched.part.hint;
    let name = matched.part.name.clone();

    let determined = if content.is_empty() {
        if let Some(hint) = hint.filter(|h| h.is_numeric()) {
            messages.push(CompilerMessage::localised(
                source_name,
                CompilerMessageCode::TypeRequiresValueForArgument,
                reference.token_range(matched.tokens.clone()),
                |args| {
                    args.set("hint", hint.as_str());
                    args.set("name", name.clone());
                },
            ));
        }
        Some(ArgumentType::Text)
    } else if content.len() > 1 || padded_start || padded_end {
        let dynamic = content
            .clone()
            .filter_map(|index| text.get(index))
            .any(|token| token.kind.is_dynamic());
        if dynamic { None } else { Some(ArgumentType::Text) }
    } else {
        text.get(content.start)
            .and_then(|token| token.kind.inferred_type())
    };

    if let (Some(inferred), Some(hint)) = (determined, hint) {
        if !content.is_empty() && !inferred.satisfies(hint) {
            messages.push(CompilerMessage::localised(
                source_name,
                CompilerMessageCode::ArgumentTypeNotCompatible,
                reference.token_range(content.clone()),
                |args| {
                    args.set("value", raw_text.clone());
                    args.set("hint", hint.as_str());
                    args.set("name", name.clone());
                },
            ));
        }
    }

    if options.whitespace_warnings && (padded_start || padded_end) {
        messages.push(CompilerMessage::localised(
            source_name,
            CompilerMessageCode::ArgumentHasSurroundingWhitespace,
            reference.token_range(matched.tokens.clone()),
            |args| args.set("name", name.clone()),
        ));
    }

    let binding = ArgumentBinding::new(
        matched.part.clone(),
        matched.tokens.clone(),
        matched.start_exclusive,
        matched.end_exclusive,
        determined,
        raw_text,
    );
    (binding, messages)
}
