//! The plugin's action flows: a declarative mapping from user actions to
//! client calls plus host dialogs. Everything here runs against the
//! [`TraktApi`] trait and the host capability traits, so the same flows
//! drive a real media center and the test fakes alike.

use anyhow::Result;
use tracing::info;

use crate::host::{
    ContextAction, MenuItem, MenuTarget, MovieInfo, SettingsStore, UserInterface,
    SETTING_DEFAULT_LIST, SETTING_DEFAULT_LIST_SLUG, SETTING_PASSWORD, SETTING_USERNAME,
};
use crate::models::{ListSummary, Movie};
use crate::strings::{localized, StringCatalog, StringKey};
use crate::trakt::TraktApi;

/// API key the plugin identifies itself with.
pub const API_KEY: &str = "2ce240ab6543ebd7d84abe5268a822d5";

/// Read credentials from settings and connect, re-prompting through the
/// host dialogs until the user either succeeds or gives up. Returns whether
/// a session was established; transport failures propagate to the host.
pub async fn establish_session(
    api: &mut dyn TraktApi,
    ui: &mut dyn UserInterface,
    settings: &mut dyn SettingsStore,
    strings: &dyn StringCatalog,
) -> Result<bool> {
    loop {
        let username = settings.get(SETTING_USERNAME).unwrap_or_default();
        let password = settings.get(SETTING_PASSWORD).unwrap_or_default();
        if api.connect(&username, &password, API_KEY, true).await? {
            info!("Session established for '{}'", username);
            return Ok(true);
        }
        let heading = localized(strings, StringKey::ConnectionError);
        let lines = [
            localized(strings, StringKey::WrongCredentials),
            localized(strings, StringKey::WantSetNow),
        ];
        if !ui.confirm(&heading, &lines) {
            return Ok(false);
        }
        settings.open_editor();
    }
}

/// All menu flows, bundled over the client and the host capabilities.
pub struct Menu<'a> {
    pub api: &'a mut dyn TraktApi,
    pub ui: &'a mut dyn UserInterface,
    pub settings: &'a mut dyn SettingsStore,
    pub strings: &'a dyn StringCatalog,
}

impl Menu<'_> {
    fn text(&self, key: StringKey) -> String {
        localized(self.strings, key)
    }

    fn after_mutation(&mut self, success: bool, refresh: bool) {
        if success {
            let msg = self.text(StringKey::Success);
            self.ui.notify(&msg);
            if refresh {
                self.ui.refresh();
            }
        }
    }

    /// Root listing: one entry per remote list, the watchlist, and a
    /// "new list" entry.
    pub async fn show_lists(&mut self) -> Result<()> {
        let lists = self.api.get_lists().await?;
        let mut items: Vec<MenuItem> = lists
            .iter()
            .map(|list| MenuItem {
                label: format!("{} ({})", list.name, list.privacy),
                target: MenuTarget::OpenList {
                    slug: list.slug.clone(),
                },
                info: None,
                context: vec![
                    ContextAction::DeleteList {
                        slug: list.slug.clone(),
                    },
                    ContextAction::OpenSettings,
                ],
            })
            .collect();
        items.push(MenuItem::plain(
            self.text(StringKey::Watchlist),
            MenuTarget::OpenWatchlist,
        ));
        items.push(MenuItem::plain(
            self.text(StringKey::NewList),
            MenuTarget::NewList,
        ));
        self.ui.present_list(items);
        Ok(())
    }

    /// Contents of one list: its movies plus an "add movie" entry.
    pub async fn show_list(&mut self, list_slug: &str) -> Result<()> {
        let list = self.api.get_list(list_slug).await?;
        let mut items = Vec::new();
        for entry in &list.items {
            if entry.item_type != "movie" {
                continue;
            }
            let Some(movie) = &entry.movie else { continue };
            items.push(MenuItem {
                label: movie.title.clone(),
                target: MenuTarget::ShowHelp,
                info: Some(movie_info(movie, entry.plays)),
                context: vec![
                    ContextAction::DeleteMovie {
                        slug: list_slug.to_string(),
                        imdb_id: movie.imdb_id.clone().unwrap_or_default(),
                        tmdb_id: movie.tmdb_id.clone().unwrap_or_default(),
                    },
                    ContextAction::OpenSettings,
                ],
            });
        }
        items.push(MenuItem::plain(
            self.text(StringKey::AddMovie),
            MenuTarget::AddMovie {
                slug: list_slug.to_string(),
            },
        ));
        self.ui.present_list(items);
        Ok(())
    }

    pub async fn show_watchlist(&mut self) -> Result<()> {
        let entries = self.api.get_watchlist().await?;
        let mut items = Vec::new();
        for entry in &entries {
            let Some(movie) = &entry.movie else { continue };
            items.push(MenuItem {
                label: movie.title.clone(),
                target: MenuTarget::ShowHelp,
                info: Some(movie_info(movie, entry.plays)),
                context: vec![
                    ContextAction::RemoveFromWatchlist {
                        imdb_id: movie.imdb_id.clone().unwrap_or_default(),
                        tmdb_id: movie.tmdb_id.clone().unwrap_or_default(),
                    },
                    ContextAction::OpenSettings,
                ],
            });
        }
        items.push(MenuItem::plain(
            self.text(StringKey::AddMovie),
            MenuTarget::AddToWatchlist,
        ));
        self.ui.present_list(items);
        Ok(())
    }

    /// Ask for a title and create the list. A cancelled or empty prompt is
    /// a silent no-op.
    pub async fn new_list(&mut self, refresh: bool) -> Result<()> {
        let heading = self.text(StringKey::EnterListTitle);
        let Some(title) = self.ui.prompt_text(&heading).filter(|t| !t.is_empty()) else {
            return Ok(());
        };
        info!("Creating list '{}'", title);
        let result = self.api.add_list(&title, None, None).await?;
        self.after_mutation(result.is_success(), refresh);
        Ok(())
    }

    pub async fn delete_list(&mut self, list_slug: &str, refresh: bool) -> Result<()> {
        let heading = self.text(StringKey::DeleteListHead);
        let lines = [self.text(StringKey::DeleteListLine)];
        if !self.ui.confirm(&heading, &lines) {
            return Ok(());
        }
        info!("Deleting list '{}'", list_slug);
        let result = self.api.del_list(list_slug).await?;
        self.after_mutation(result.is_success(), refresh);
        Ok(())
    }

    /// Search for a movie and add it to the default list when one is
    /// configured, otherwise to a list the user picks.
    pub async fn add_movie(&mut self, refresh: bool) -> Result<()> {
        let Some(movie) = self.ask_movie().await? else {
            return Ok(());
        };
        let slug = match self
            .settings
            .get(SETTING_DEFAULT_LIST_SLUG)
            .filter(|s| !s.is_empty())
        {
            Some(slug) => slug,
            None => match self.ask_list().await? {
                Some(list) => list.slug,
                None => return Ok(()),
            },
        };
        self.add_given_movie(
            &slug,
            movie.imdb_id.as_deref(),
            movie.tmdb_id.as_deref(),
            refresh,
        )
        .await
    }

    /// Search for a movie and add it to the given list.
    pub async fn add_movie_to_given_list(&mut self, list_slug: &str, refresh: bool) -> Result<()> {
        let Some(movie) = self.ask_movie().await? else {
            return Ok(());
        };
        self.add_given_movie(
            list_slug,
            movie.imdb_id.as_deref(),
            movie.tmdb_id.as_deref(),
            refresh,
        )
        .await
    }

    pub async fn add_given_movie(
        &mut self,
        list_slug: &str,
        imdb_id: Option<&str>,
        tmdb_id: Option<&str>,
        refresh: bool,
    ) -> Result<()> {
        let result = self
            .api
            .add_movie_to_list(list_slug, imdb_id, tmdb_id)
            .await?;
        self.after_mutation(result.is_success(), refresh);
        Ok(())
    }

    pub async fn delete_movie(
        &mut self,
        list_slug: &str,
        imdb_id: Option<&str>,
        tmdb_id: Option<&str>,
        refresh: bool,
    ) -> Result<()> {
        let heading = self.text(StringKey::DeleteMovieHead);
        let lines = [self.text(StringKey::DeleteMovieLine)];
        if !self.ui.confirm(&heading, &lines) {
            return Ok(());
        }
        let result = self
            .api
            .del_movie_from_list(list_slug, imdb_id, tmdb_id)
            .await?;
        self.after_mutation(result.is_success(), refresh);
        Ok(())
    }

    pub async fn add_movie_to_watchlist(&mut self, refresh: bool) -> Result<()> {
        let Some(movie) = self.ask_movie().await? else {
            return Ok(());
        };
        let result = self
            .api
            .add_movie_to_watchlist(movie.imdb_id.as_deref(), movie.tmdb_id.as_deref())
            .await?;
        self.after_mutation(result.is_success(), refresh);
        Ok(())
    }

    pub async fn delete_movie_from_watchlist(
        &mut self,
        imdb_id: Option<&str>,
        tmdb_id: Option<&str>,
        refresh: bool,
    ) -> Result<()> {
        let heading = self.text(StringKey::DeleteMovieHead);
        let lines = [self.text(StringKey::DeleteMovieLine)];
        if !self.ui.confirm(&heading, &lines) {
            return Ok(());
        }
        let result = self
            .api
            .del_movie_from_watchlist(imdb_id, tmdb_id)
            .await?;
        self.after_mutation(result.is_success(), refresh);
        Ok(())
    }

    /// Pick a list and remember it as the default target for quick adds;
    /// backing out clears the default.
    pub async fn set_default_list(&mut self) -> Result<()> {
        match self.ask_list().await? {
            Some(list) => {
                self.settings.set(SETTING_DEFAULT_LIST, &list.name);
                self.settings.set(SETTING_DEFAULT_LIST_SLUG, &list.slug);
            }
            None => {
                self.settings.set(SETTING_DEFAULT_LIST, "");
                self.settings.set(SETTING_DEFAULT_LIST_SLUG, "");
            }
        }
        Ok(())
    }

    pub fn show_help(&mut self) {
        let heading = self.text(StringKey::HelpHead);
        let lines = [
            self.text(StringKey::HelpLine1),
            self.text(StringKey::HelpLine2),
            self.text(StringKey::HelpLine3),
        ];
        self.ui.confirm(&heading, &lines);
    }

    async fn ask_movie(&mut self) -> Result<Option<Movie>> {
        let heading = self.text(StringKey::EnterMovieTitle);
        let Some(query) = self.ui.prompt_text(&heading).filter(|q| !q.is_empty()) else {
            return Ok(None);
        };
        let movies = self.api.search_movie(&query).await?;
        if movies.is_empty() {
            let msg = self.text(StringKey::NoMovieFound);
            self.ui.notify(&msg);
            return Ok(None);
        }
        let labels: Vec<String> = movies
            .iter()
            .map(|movie| match movie.year {
                Some(year) => format!("{} ({})", movie.title, year),
                None => movie.title.clone(),
            })
            .collect();
        let heading = self.text(StringKey::SelectMovie);
        let Some(index) = self.ui.prompt_choice(&heading, &labels) else {
            return Ok(None);
        };
        Ok(movies.into_iter().nth(index))
    }

    async fn ask_list(&mut self) -> Result<Option<ListSummary>> {
        let lists = self.api.get_lists().await?;
        let labels: Vec<String> = lists.iter().map(|list| list.name.clone()).collect();
        let heading = self.text(StringKey::SelectList);
        let Some(index) = self.ui.prompt_choice(&heading, &labels) else {
            return Ok(None);
        };
        Ok(lists.into_iter().nth(index))
    }
}

fn movie_info(movie: &Movie, plays: u32) -> MovieInfo {
    MovieInfo {
        imdb_id: movie.imdb_id.clone(),
        year: movie.year,
        plot: movie.overview.clone(),
        certification: movie.certification.clone(),
        tagline: movie.tagline.clone(),
        genres: movie.genres.clone(),
        plays,
        rating: movie.ratings.percentage / 10.0,
        votes: movie.ratings.votes,
        duration_secs: movie.runtime.unwrap_or(0) * 60,
        poster: movie.images.poster.clone(),
        fanart: movie.images.fanart.clone(),
    }
}
