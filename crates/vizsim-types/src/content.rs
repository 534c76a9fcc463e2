//! Content schemas for the portfolio pages.
//!
//! Content arrives as loosely-shaped JSON. Everything is parsed into explicit
//! structs and validated here, so renderers only ever see well-formed records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{ContentError, ContentResult};

/// Lifecycle stage of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Planning,
    Active,
    Completed,
    Paused,
}

/// Broad category of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectKind {
    Research,
    Engineering,
    Theoretical,
}

/// How a project page visualizes its progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisualizationKind {
    ResearchFlow,
    Timeline,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visualization {
    #[serde(rename = "type")]
    pub kind: VisualizationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
}

/// A project entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub slug: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub date: NaiveDate,
    pub status: ProjectStatus,
    #[serde(rename = "type")]
    pub kind: ProjectKind,
    pub excerpt: String,
    #[serde(default)]
    pub featured: bool,
    /// Identifiers of related publications
    #[serde(default)]
    pub publications: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visualization: Option<Visualization>,
}

impl Project {
    pub fn validate(&self) -> ContentResult<()> {
        validate_slug(&self.slug)?;
        require("project", "title", &self.title)?;
        require("project", "excerpt", &self.excerpt)
    }
}

/// A dated news entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub date: NaiveDate,
    pub content: String,
}

/// One seasonal news file: `{ "news": [...] }`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewsFile {
    #[serde(default)]
    pub news: Vec<NewsItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    pub id: String,
    pub title: String,
    pub authors: Vec<String>,
    pub venue: String,
    pub year: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Publication {
    pub fn validate(&self) -> ContentResult<()> {
        require("publication", "id", &self.id)?;
        require("publication", "title", &self.title)?;
        if self.authors.is_empty() {
            return Err(ContentError::MissingField {
                kind: "publication",
                field: "authors",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Talk {
    pub title: String,
    pub event: String,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

fn require(kind: &'static str, field: &'static str, value: &str) -> ContentResult<()> {
    if value.trim().is_empty() {
        Err(ContentError::MissingField { kind, field })
    } else {
        Ok(())
    }
}

fn validate_slug(slug: &str) -> ContentResult<()> {
    let well_formed = !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if well_formed {
        Ok(())
    } else {
        Err(ContentError::InvalidSlug(slug.to_string()))
    }
}

/// Parse, validate and sort projects newest-first
pub fn load_projects(json: &str) -> ContentResult<Vec<Project>> {
    let mut projects: Vec<Project> = serde_json::from_str(json)?;
    let mut seen = HashSet::new();
    for project in &projects {
        project.validate()?;
        if !seen.insert(project.slug.as_str()) {
            return Err(ContentError::Duplicate {
                kind: "project",
                id: project.slug.clone(),
            });
        }
    }
    projects.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(projects)
}

pub fn find_project<'a>(projects: &'a [Project], slug: &str) -> Option<&'a Project> {
    projects.iter().find(|p| p.slug == slug)
}

pub fn featured_projects(projects: &[Project]) -> Vec<&Project> {
    projects.iter().filter(|p| p.featured).collect()
}

/// Merge seasonal news files into one feed, newest first
pub fn load_news<'a, I>(files: I) -> ContentResult<Vec<NewsItem>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut all = Vec::new();
    for json in files {
        let file: NewsFile = serde_json::from_str(json)?;
        for item in &file.news {
            require("news item", "content", &item.content)?;
        }
        all.extend(file.news);
    }
    all.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(all)
}

pub fn load_publications(json: &str) -> ContentResult<Vec<Publication>> {
    let publications: Vec<Publication> = serde_json::from_str(json)?;
    let mut seen = HashSet::new();
    for publication in &publications {
        publication.validate()?;
        if !seen.insert(publication.id.as_str()) {
            return Err(ContentError::Duplicate {
                kind: "publication",
                id: publication.id.clone(),
            });
        }
    }
    Ok(publications)
}

/// Parse talks, newest first
pub fn load_talks(json: &str) -> ContentResult<Vec<Talk>> {
    let mut talks: Vec<Talk> = serde_json::from_str(json)?;
    for talk in &talks {
        require("talk", "title", &talk.title)?;
        require("talk", "event", &talk.event)?;
    }
    talks.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(talks)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROJECTS: &str = r#"[
        {
            "slug": "evolving-research",
            "title": "Evolving Research",
            "subtitle": "Digital evolution of discovery",
            "date": "2025-01-22",
            "status": "planning",
            "type": "theoretical",
            "excerpt": "Understanding how research itself has evolved.",
            "featured": true
        },
        {
            "slug": "research-tracking",
            "title": "Research Tracking System",
            "date": "2025-01-20",
            "status": "active",
            "type": "research",
            "excerpt": "Tracking questions, experiments and findings.",
            "publications": ["markov-icl"],
            "visualization": { "type": "research-flow", "component": "ResearchFlow" }
        },
        {
            "slug": "old-notes",
            "title": "Old Notes",
            "date": "2024-06-01",
            "status": "paused",
            "type": "engineering",
            "excerpt": "Archived."
        }
    ]"#;

    #[test]
    fn test_projects_sorted_newest_first() {
        let projects = load_projects(PROJECTS).unwrap();
        let slugs: Vec<_> = projects.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["evolving-research", "research-tracking", "old-notes"]);

        let tracking = find_project(&projects, "research-tracking").unwrap();
        assert_eq!(tracking.publications, vec!["markov-icl".to_string()]);
        assert_eq!(
            tracking.visualization.as_ref().map(|v| v.kind),
            Some(VisualizationKind::ResearchFlow)
        );
        assert!(find_project(&projects, "missing").is_none());
        assert_eq!(featured_projects(&projects).len(), 1);
    }

    #[test]
    fn test_invalid_slug_rejected() {
        let json = r#"[{ "slug": "Bad Slug", "title": "t", "date": "2025-01-01",
            "status": "active", "type": "research", "excerpt": "e" }]"#;
        assert!(matches!(load_projects(json), Err(ContentError::InvalidSlug(_))));
    }

    #[test]
    fn test_unknown_status_is_parse_error() {
        let json = r#"[{ "slug": "x", "title": "t", "date": "2025-01-01",
            "status": "someday", "type": "research", "excerpt": "e" }]"#;
        assert!(matches!(load_projects(json), Err(ContentError::Parse(_))));
    }

    #[test]
    fn test_bad_date_is_parse_error() {
        let json = r#"[{ "slug": "x", "title": "t", "date": "January 5th",
            "status": "active", "type": "research", "excerpt": "e" }]"#;
        assert!(matches!(load_projects(json), Err(ContentError::Parse(_))));
    }

    #[test]
    fn test_duplicate_slug_rejected() {
        let json = r#"[
            { "slug": "x", "title": "a", "date": "2025-01-01",
              "status": "active", "type": "research", "excerpt": "e" },
            { "slug": "x", "title": "b", "date": "2025-01-02",
              "status": "active", "type": "research", "excerpt": "e" }
        ]"#;
        assert!(matches!(load_projects(json), Err(ContentError::Duplicate { .. })));
    }

    #[test]
    fn test_news_merged_across_files() {
        let spring = r#"{ "news": [{ "date": "2024-03-02", "content": "Spring talk" }] }"#;
        let fall = r#"{ "news": [
            { "date": "2024-10-11", "content": "Paper accepted" },
            { "date": "2024-09-01", "content": "Started PhD" }
        ] }"#;
        let empty = r#"{}"#;

        let news = load_news([spring, fall, empty]).unwrap();
        let dates: Vec<_> = news.iter().map(|n| n.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-10-11", "2024-09-01", "2024-03-02"]);
    }

    #[test]
    fn test_publication_requires_authors() {
        let json = r#"[{ "id": "p1", "title": "T", "authors": [], "venue": "V", "year": 2024 }]"#;
        assert!(matches!(
            load_publications(json),
            Err(ContentError::MissingField { field: "authors", .. })
        ));
    }

    #[test]
    fn test_talks_sorted() {
        let json = r#"[
            { "title": "A", "event": "Workshop", "date": "2023-05-01" },
            { "title": "B", "event": "Seminar", "date": "2024-02-01", "location": "Online" }
        ]"#;
        let talks = load_talks(json).unwrap();
        assert_eq!(talks[0].title, "B");
        assert_eq!(talks[0].location.as_deref(), Some("Online"));
    }
}
