//! Localised diagnostic text.
//!
//! Message text for every [`CompilerMessageCode`](crate::CompilerMessageCode)
//! is stored as Fluent resources embedded in the crate. English is loaded by
//! default; callers can pick other locales globally or install a per-thread
//! override with [`ScopedLocalisation`].

use std::cell::RefCell;
use std::sync::{LazyLock, PoisonError, RwLock};

use fluent::FluentArgs;
use i18n_embed::I18nEmbedError;
use i18n_embed::fluent::{FluentLanguageLoader, fluent_language_loader};
use rust_embed::RustEmbed;
use thiserror::Error;
use unic_langid::LanguageIdentifier;

/// Embedded Fluent resources shipped with the crate.
#[derive(RustEmbed)]
#[folder = "i18n"]
pub struct Localisations;

static LANGUAGE_LOADER: LazyLock<RwLock<FluentLanguageLoader>> = LazyLock::new(|| {
    let loader = fluent_language_loader!();
    i18n_embed::select(&loader, &Localisations, &[unic_langid::langid!("en-US")])
        .unwrap_or_else(|error| panic!("failed to load default English translations: {error}"));
    RwLock::new(loader)
});

thread_local! {
    static OVERRIDE_LOADER: RefCell<Option<FluentLanguageLoader>> = const { RefCell::new(None) };
}

/// Errors from localisation setup.
#[derive(Debug, Error)]
pub enum LocalisationError {
    /// The global loader lock was poisoned.
    #[error("localisation state is poisoned")]
    Poisoned,
    /// Loading or selecting Fluent resources failed.
    #[error("failed to load localisation resources: {0}")]
    Loader(#[from] I18nEmbedError),
}

/// Guard that installs a thread-local loader until dropped.
#[must_use]
pub struct ScopedLocalisation {
    previous: Option<FluentLanguageLoader>,
}

impl ScopedLocalisation {
    /// Load `requested` into a dedicated loader and make it active for the
    /// current thread.
    ///
    /// # Errors
    ///
    /// Returns [`LocalisationError::Loader`] if the resources cannot be loaded.
    pub fn new(requested: &[LanguageIdentifier]) -> Result<Self, LocalisationError> {
        let loader = fluent_language_loader!();
        i18n_embed::select(&loader, &Localisations, requested)?;
        let previous = OVERRIDE_LOADER.with(|cell| cell.replace(Some(loader)));
        Ok(Self { previous })
    }
}

impl Drop for ScopedLocalisation {
    fn drop(&mut self) {
        let previous = self.previous.take();
        OVERRIDE_LOADER.with(|cell| {
            *cell.borrow_mut() = previous;
        });
    }
}

/// Activate the best matching locales for the global loader.
///
/// # Errors
///
/// Returns [`LocalisationError::Poisoned`] if the global lock is poisoned or
/// [`LocalisationError::Loader`] when resource selection fails.
pub fn select_localisations(
    requested: &[LanguageIdentifier],
) -> Result<Vec<LanguageIdentifier>, LocalisationError> {
    let guard = LANGUAGE_LOADER
        .read()
        .map_err(|_| LocalisationError::Poisoned)?;
    Ok(i18n_embed::select(&*guard, &Localisations, requested)?)
}

/// Render message `id` with arguments supplied by `configure`.
///
/// Directional isolates inserted by Fluent around interpolated values are
/// stripped so messages read cleanly in terminals.
#[must_use]
pub fn message_with_args<F>(id: &str, configure: F) -> String
where
    F: FnOnce(&mut FluentArgs<'static>),
{
    let mut args: FluentArgs<'static> = FluentArgs::new();
    configure(&mut args);
    let rendered = with_loader(|loader| loader.get_args_fluent(id, Some(&args)));
    strip_directional_isolates(&rendered)
}

fn with_loader<R>(callback: impl FnOnce(&FluentLanguageLoader) -> R) -> R {
    OVERRIDE_LOADER.with(|cell| {
        let borrow = cell.borrow();
        if let Some(loader) = borrow.as_ref() {
            return callback(loader);
        }
        drop(borrow);
        let guard = LANGUAGE_LOADER
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        callback(&guard)
    })
}

/// Remove Unicode directional isolates inserted by Fluent during interpolation.
#[must_use]
pub fn strip_directional_isolates(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(*c, '\u{2066}' | '\u{2067}' | '\u{2068}' | '\u{2069}'))
        .collect()
}
