//! Localized string lookup through an injected provider. Lookups are keyed
//! by symbolic identifiers; a missing entry falls back to the identifier's
//! name and logs a warning, so a half-translated catalog degrades visibly
//! instead of crashing a dialog.

use std::collections::HashMap;
use tracing::warn;

/// Every user-facing string the menu layer needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringKey {
    // Root menu entries
    NewList,
    AddMovie,
    Watchlist,
    // Context menu
    AddonSettings,
    DeleteList,
    DeleteMovie,
    // Dialogs
    EnterListTitle,
    EnterMovieTitle,
    SelectMovie,
    SelectList,
    DeleteMovieHead,
    DeleteMovieLine,
    DeleteListHead,
    DeleteListLine,
    // Error dialogs
    ConnectionError,
    WrongCredentials,
    WantSetNow,
    // Notifications
    NoMovieFound,
    Success,
    // Help dialog
    HelpHead,
    HelpLine1,
    HelpLine2,
    HelpLine3,
}

impl StringKey {
    pub fn name(self) -> &'static str {
        match self {
            StringKey::NewList => "new_list",
            StringKey::AddMovie => "add_movie",
            StringKey::Watchlist => "watchlist",
            StringKey::AddonSettings => "addon_settings",
            StringKey::DeleteList => "delete_list",
            StringKey::DeleteMovie => "delete_movie",
            StringKey::EnterListTitle => "enter_list_title",
            StringKey::EnterMovieTitle => "enter_movie_title",
            StringKey::SelectMovie => "select_movie",
            StringKey::SelectList => "select_list",
            StringKey::DeleteMovieHead => "delete_movie_head",
            StringKey::DeleteMovieLine => "delete_movie_l1",
            StringKey::DeleteListHead => "delete_list_head",
            StringKey::DeleteListLine => "delete_list_l1",
            StringKey::ConnectionError => "connection_error",
            StringKey::WrongCredentials => "wrong_credentials",
            StringKey::WantSetNow => "want_set_now",
            StringKey::NoMovieFound => "no_movie_found",
            StringKey::Success => "success",
            StringKey::HelpHead => "help_head",
            StringKey::HelpLine1 => "help_l1",
            StringKey::HelpLine2 => "help_l2",
            StringKey::HelpLine3 => "help_l3",
        }
    }
}

/// Provider of localized text, implemented by a host adapter.
pub trait StringCatalog: Send + Sync {
    fn lookup(&self, key: StringKey) -> Option<String>;
}

impl StringCatalog for HashMap<StringKey, String> {
    fn lookup(&self, key: StringKey) -> Option<String> {
        self.get(&key).cloned()
    }
}

/// Resolve a key against the catalog, falling back to the symbolic name.
pub fn localized(catalog: &dyn StringCatalog, key: StringKey) -> String {
    match catalog.lookup(key) {
        Some(text) => text,
        None => {
            warn!(key = key.name(), "string is missing");
            key.name().to_string()
        }
    }
}
