//! Page catalog and the context handed to the rendering layer.
//!
//! Rendering itself happens elsewhere; this module decides which page a route
//! names and bundles the resolved locale with its messages, explicitly, so
//! nothing downstream has to look them up ambiently.

use crate::i18n::{Locale, LocaleRegistry, MessageMapping};
use chrono::{Datelike, Utc};
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

/// Footer line used when the messages carry no `footer.copyright` template
const DEFAULT_COPYRIGHT: &str = "© {year} Fredy Munevar. All rights reserved.";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Page not found: {0}")]
pub struct PageNotFound(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Section {
    About,
    Toolbox,
    Contact,
    Projects,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::About,
        Section::Toolbox,
        Section::Contact,
        Section::Projects,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Section::About => "about",
            Section::Toolbox => "toolbox",
            Section::Contact => "contact",
            Section::Projects => "projects",
        }
    }

    pub fn from_slug(slug: &str) -> Result<Section, PageNotFound> {
        Section::ALL
            .into_iter()
            .find(|s| s.slug() == slug)
            .ok_or_else(|| PageNotFound(slug.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Project {
    Precision,
    Weelo,
    MonteFrio,
    Hola,
    Branch,
    Million,
}

/// One tab of a project's code sample viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SnippetInfo {
    /// Tab label
    pub name: &'static str,
    /// File under `{snippets_dir}/{project}/`
    pub filename: &'static str,
    /// Syntax highlighting language
    pub language: &'static str,
}

const fn snippet(
    name: &'static str,
    filename: &'static str,
    language: &'static str,
) -> SnippetInfo {
    SnippetInfo {
        name,
        filename,
        language,
    }
}

const HOLA_SNIPPETS: &[SnippetInfo] = &[
    snippet("BookingCalendar", "BookingCalendar.tsx", "tsx"),
    snippet("BookingCalendar.style", "BookingCalendar.style.ts", "typescript"),
    snippet("SearchScreen", "SearchScreen.tsx", "tsx"),
];

const MILLION_SNIPPETS: &[SnippetInfo] = &[
    snippet("LeadListContainer", "LeadListContainer.tsx", "tsx"),
    snippet("LeadListContainer.style", "LeadListContainer.style.ts", "typescript"),
    snippet("List", "List.tsx", "tsx"),
];

const WEELO_SNIPPETS: &[SnippetInfo] = &[
    snippet("PaymentAddDetail", "PaymentAddDetail.tsx", "tsx"),
    snippet("PaymentAddDetail.styles", "PaymentAddDetail.styles.ts", "typescript"),
    snippet("PaymentAddDetailPresenter", "PaymentAddDetailPresenter.tsx", "tsx"),
];

impl Project {
    pub const ALL: [Project; 6] = [
        Project::Precision,
        Project::Weelo,
        Project::MonteFrio,
        Project::Hola,
        Project::Branch,
        Project::Million,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Project::Precision => "precision",
            Project::Weelo => "weelo",
            Project::MonteFrio => "monte-frio",
            Project::Hola => "hola",
            Project::Branch => "branch",
            Project::Million => "million",
        }
    }

    pub fn from_slug(slug: &str) -> Result<Project, PageNotFound> {
        Project::ALL
            .into_iter()
            .find(|p| p.slug() == slug)
            .ok_or_else(|| PageNotFound(format!("projects/{}", slug)))
    }

    /// Message namespace the project page reads from.
    pub fn namespace(&self) -> &'static str {
        match self {
            Project::Precision => "precision",
            Project::Weelo => "weelo",
            Project::MonteFrio => "monteFrio",
            Project::Hola => "hola",
            Project::Branch => "branch",
            Project::Million => "million",
        }
    }

    /// Code samples published for the project (empty for design-only work).
    pub fn snippets(&self) -> &'static [SnippetInfo] {
        match self {
            Project::Hola => HOLA_SNIPPETS,
            Project::Million => MILLION_SNIPPETS,
            Project::Weelo => WEELO_SNIPPETS,
            Project::Precision | Project::MonteFrio | Project::Branch => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "slug", rename_all = "lowercase")]
pub enum Page {
    Home,
    Section(Section),
    Project(Project),
}

impl Page {
    /// Message namespace the page's own copy lives under.
    pub fn namespace(&self) -> Option<&'static str> {
        match self {
            Page::Home => None,
            Page::Section(section) => Some(section.slug()),
            Page::Project(project) => Some(project.namespace()),
        }
    }

    pub fn path(&self, locale: Locale) -> String {
        match self {
            Page::Home => format!("/{}", locale),
            Page::Section(section) => format!("/{}/{}", locale, section.slug()),
            Page::Project(project) => format!("/{}/projects/{}", locale, project.slug()),
        }
    }
}

/// Entry for the language switch: the same page in another locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alternate {
    pub locale: &'static str,
    pub label: &'static str,
    pub path: String,
}

/// Everything the renderer needs for one page.
#[derive(Debug, Serialize)]
pub struct PageContext<'a> {
    pub locale: Locale,
    pub page: Page,
    pub path: String,
    pub namespace: Option<&'static str>,
    /// The page's own namespace, `None` for the home page or when the
    /// messages don't carry it
    pub page_messages: Option<MessageMapping>,
    pub title: Option<String>,
    pub copyright: String,
    pub alternates: Vec<Alternate>,
    pub messages: &'a MessageMapping,
    pub snippets: &'static [SnippetInfo],
}

impl<'a> PageContext<'a> {
    pub fn new(locale: Locale, page: Page, messages: &'a MessageMapping) -> Self {
        let alternates = LocaleRegistry::get()
            .list()
            .iter()
            .filter(|config| config.code != locale.code())
            .filter_map(|config| Locale::from_code(config.code).ok())
            .map(|other| Alternate {
                locale: other.code(),
                label: other.native_name(),
                path: page.path(other),
            })
            .collect();

        let snippets: &'static [SnippetInfo] = match page {
            Page::Project(project) => project.snippets(),
            Page::Home | Page::Section(_) => &[],
        };

        let page_messages = page.namespace().and_then(|ns| messages.namespace(ns));
        let title = page_messages
            .as_ref()
            .and_then(|m| m.text("title"))
            .map(str::to_string);

        Self {
            locale,
            page,
            path: page.path(locale),
            namespace: page.namespace(),
            page_messages,
            title,
            copyright: copyright(messages, Utc::now().year()),
            alternates,
            messages,
            snippets,
        }
    }
}

fn copyright(messages: &MessageMapping, year: i32) -> String {
    let year = year.to_string();
    let args = HashMap::from([("year", year.clone())]);
    messages
        .format("footer.copyright", &args)
        .unwrap_or_else(|| DEFAULT_COPYRIGHT.replace("{year}", &year))
}
