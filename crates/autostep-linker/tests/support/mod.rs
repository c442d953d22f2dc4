//! Shared fixtures for linker integration tests.

use autostep_linker::{
    ArgumentValue, BuiltFile, CompilerMessage, CompilerMessageCode, FeatureElement,
    InvocationError, NativeStepSource, ScenarioElement, SourceLocation, StepCollectionBuilder,
};
use autostep_patterns::StepType;

/// Handler that accepts any arguments.
pub fn noop(_: &[ArgumentValue]) -> Result<(), InvocationError> {
    Ok(())
}

/// Native source with one no-op handler per declaration.
pub fn native(uid: &str, steps: &[(StepType, &str)]) -> NativeStepSource {
    steps
        .iter()
        .fold(NativeStepSource::new(uid, uid), |source, (ty, declaration)| {
            source.step(*ty, declaration, declaration, noop)
        })
}

/// File with a single scenario. Step `n` sits on line `n + 3`, its text
/// starting at column 9.
pub fn scenario_file(name: &str, steps: &[(StepType, &str)]) -> BuiltFile {
    let mut builder = StepCollectionBuilder::new();
    for (index, (ty, text)) in steps.iter().enumerate() {
        builder.add(*ty, text, SourceLocation::new(index + 3, 9), None);
    }
    let mut file = BuiltFile::new(name);
    file.feature = Some(FeatureElement {
        name: "Feature".into(),
        location: SourceLocation::new(1, 1),
        scenarios: vec![ScenarioElement {
            name: "Scenario".into(),
            location: SourceLocation::new(2, 3),
            steps: builder.build(),
            ..ScenarioElement::default()
        }],
        ..FeatureElement::default()
    });
    file
}

/// Codes of `messages` in order.
pub fn codes(messages: &[CompilerMessage]) -> Vec<CompilerMessageCode> {
    messages.iter().map(|message| message.code).collect()
}
