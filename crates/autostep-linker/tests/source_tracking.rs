//! Behavioural tests for incremental source registration.

mod support;

use std::time::{Duration, SystemTime};

use autostep_linker::{
    BuiltFile, CompilerMessageCode, DefinitionKey, FileStepDefinitionSource, Linker, LinkerError,
    RefreshSummary, SourceLocation, SourceUid, StepDefinitionElement,
};
use autostep_patterns::StepType;
use support::{codes, native, scenario_file};

fn definitions_file(declarations: &[&str]) -> BuiltFile {
    let mut file = BuiltFile::new("defs.as");
    for (line, declaration) in declarations.iter().enumerate() {
        file.step_definitions.push(StepDefinitionElement::new(
            StepType::Given,
            *declaration,
            SourceLocation::new(line + 1, 7),
        ));
    }
    file
}

fn key_for(linker: &Linker, text: &str) -> Option<DefinitionKey> {
    linker
        .match_step(StepType::Given, text, false)
        .first()
        .map(|result| result.key)
}

fn summary(linker: &mut Linker, source: &FileStepDefinitionSource) -> RefreshSummary {
    let result = linker.add_or_update_step_definition_source(source);
    assert!(result.success(), "{:?}", result.messages());
    result.output().copied().unwrap_or_default()
}

#[test]
fn re_adding_an_unchanged_source_is_idempotent() {
    let file = definitions_file(&["a user", "a user named {name}", "{count:int} users"]);
    let source = FileStepDefinitionSource::new(&file, SystemTime::UNIX_EPOCH);
    let mut linker = Linker::new();

    let first = summary(&mut linker, &source);
    assert_eq!(first.added, 3);
    let nodes = linker.matching_tree().node_count();
    let key = key_for(&linker, "a user named bob");

    let second = summary(&mut linker, &source);
    assert_eq!(
        second,
        RefreshSummary {
            updated: 3,
            ..RefreshSummary::default()
        }
    );
    assert_eq!(linker.matching_tree().node_count(), nodes);
    assert_eq!(linker.matching_tree().definition_count(), 3);
    assert_eq!(key_for(&linker, "a user named bob"), key);
}

#[test]
fn update_touches_only_changed_signatures() {
    let mut file = definitions_file(&["a user", "a user named {name}", "an admin"]);
    let mut source = FileStepDefinitionSource::new(&file, SystemTime::UNIX_EPOCH);
    let mut linker = Linker::new();
    summary(&mut linker, &source);
    let kept = key_for(&linker, "a user named bob");

    file = definitions_file(&["a user", "a user named {name}", "a guest"]);
    source.update(&file, SystemTime::UNIX_EPOCH + Duration::from_secs(1));
    let diff = summary(&mut linker, &source);

    assert_eq!(
        diff,
        RefreshSummary {
            added: 1,
            updated: 2,
            removed: 1,
            rejected: 0,
        }
    );
    assert_eq!(key_for(&linker, "a user named bob"), kept);
    assert!(key_for(&linker, "an admin").is_none());
    assert!(key_for(&linker, "a guest").is_some());
}

#[test]
fn duplicate_signatures_within_a_source_collapse() {
    let file = definitions_file(&["a user", "a user"]);
    let source = FileStepDefinitionSource::new(&file, SystemTime::UNIX_EPOCH);
    let mut linker = Linker::new();
    summary(&mut linker, &source);
    assert_eq!(linker.matching_tree().definition_count(), 1);

    let mut scenario = scenario_file("test.feature", &[(StepType::Given, "a user")]);
    assert!(linker.link(&mut scenario).success());
}

#[test]
fn invalid_declarations_are_reported_and_skipped() {
    let mut linker = Linker::new();
    let source = native(
        "native",
        &[
            (StepType::Given, "on {day:date}"),
            (StepType::And, "an and step"),
            (StepType::Given, "a valid step"),
        ],
    );
    let result = linker.add_step_definition_source(&source);

    assert!(!result.success());
    assert_eq!(
        codes(result.messages()),
        vec![
            CompilerMessageCode::StepDefinitionDeclarationInvalid,
            CompilerMessageCode::StepDefinitionDeclarationInvalid,
        ]
    );
    assert!(
        result
            .messages()
            .iter()
            .all(|message| message.source_name.as_deref() == Some("native"))
    );
    let counts = result.output().copied().unwrap_or_default();
    assert_eq!((counts.added, counts.rejected), (1, 2));
    assert_eq!(linker.matching_tree().definition_count(), 1);
}

#[test]
fn file_declaration_errors_point_at_the_declaration() {
    let file = definitions_file(&["a valid step", "broken {here"]);
    let source = FileStepDefinitionSource::new(&file, SystemTime::UNIX_EPOCH);
    let mut linker = Linker::new();
    let result = linker.add_or_update_step_definition_source(&source);
    let [message] = result.messages() else {
        panic!("expected one message");
    };
    assert_eq!(message.source_name.as_deref(), Some("defs.as"));
    assert_eq!((message.start_line, message.start_column), (2, 7));
    assert_eq!((message.end_line, message.end_column), (2, 18));
    assert!(message.text.contains("broken {here"));
}

#[test]
fn removing_a_source_drops_its_definitions() {
    let mut linker = Linker::new();
    let empty_nodes = linker.matching_tree().node_count();
    linker.add_step_definition_source(&native(
        "native",
        &[(StepType::Given, "one"), (StepType::When, "two {x}")],
    ));
    linker.add_step_definition_source(&native("other", &[(StepType::Then, "three")]));
    let uid = SourceUid::new("native");
    assert!(linker.is_registered(&uid));
    assert_eq!(linker.source_count(), 2);

    assert_eq!(linker.remove_step_definition_source(&uid), Ok(2));
    assert!(!linker.is_registered(&uid));
    assert!(linker.matching_tree().definitions_for_source(&uid).is_empty());
    assert_eq!(linker.matching_tree().definition_count(), 1);

    assert_eq!(
        linker.remove_step_definition_source(&uid),
        Err(LinkerError::SourceNotRegistered(uid))
    );
    assert_eq!(
        linker.remove_step_definition_source(&SourceUid::new("other")),
        Ok(1)
    );
    assert_eq!(linker.matching_tree().node_count(), empty_nodes);
}

#[test]
fn adding_a_source_again_replaces_its_registration() {
    let mut linker = Linker::new();
    linker.add_step_definition_source(&native(
        "native",
        &[(StepType::Given, "one"), (StepType::Given, "two")],
    ));
    let result = linker.add_step_definition_source(&native("native", &[(StepType::Given, "two")]));
    assert_eq!(result.output().map(|counts| counts.added), Some(1));
    assert_eq!(linker.matching_tree().definition_count(), 1);
    assert!(key_for(&linker, "one").is_none());
}

#[test]
fn link_result_lists_every_referenced_source() {
    let mut linker = Linker::new();
    linker.add_step_definition_source(&native("first", &[(StepType::Given, "a user")]));
    linker.add_step_definition_source(&native("second", &[(StepType::When, "they log in")]));
    let mut file = scenario_file(
        "test.feature",
        &[(StepType::Given, "a user"), (StepType::When, "they log in")],
    );
    let result = linker.link(&mut file);
    let sources: Vec<&str> = result
        .referenced_sources()
        .iter()
        .map(SourceUid::as_str)
        .collect();
    assert_eq!(sources, vec!["first", "second"]);
}
