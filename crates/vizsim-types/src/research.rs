//! Research-tree node kinds and project resource kinds.
//!
//! Each kind carries its own styling through an exhaustive match, so adding a
//! variant fails to compile until it has a color and an icon.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ContentError;

/// Tailwind-style color family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Palette {
    Purple,
    Pink,
    Blue,
    Green,
    Yellow,
    Orange,
    Red,
    Cyan,
    Amber,
    Indigo,
    Teal,
    Rose,
    Slate,
    Gray,
}

impl Palette {
    pub fn as_str(&self) -> &'static str {
        match self {
            Palette::Purple => "purple",
            Palette::Pink => "pink",
            Palette::Blue => "blue",
            Palette::Green => "green",
            Palette::Yellow => "yellow",
            Palette::Orange => "orange",
            Palette::Red => "red",
            Palette::Cyan => "cyan",
            Palette::Amber => "amber",
            Palette::Indigo => "indigo",
            Palette::Teal => "teal",
            Palette::Rose => "rose",
            Palette::Slate => "slate",
            Palette::Gray => "gray",
        }
    }

    /// Node card classes: tinted background, stronger border, hover tint
    pub fn card_classes(&self) -> String {
        let c = self.as_str();
        format!(
            "bg-{c}-500/10 border-{c}-500/50 hover:bg-{c}-500/20",
            c = c
        )
    }

    pub fn text_class(&self) -> String {
        format!("text-{}-500", self.as_str())
    }
}

/// Step types in a research tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResearchNodeKind {
    Question,
    Hypothesis,
    Experiment,
    Observation,
    Thought,
    Work,
    Pivot,
    Idea,
    Finding,
    LiteratureReview,
    Analysis,
    Eureka,
    Pause,
}

impl ResearchNodeKind {
    pub const ALL: [ResearchNodeKind; 13] = [
        ResearchNodeKind::Question,
        ResearchNodeKind::Hypothesis,
        ResearchNodeKind::Experiment,
        ResearchNodeKind::Observation,
        ResearchNodeKind::Thought,
        ResearchNodeKind::Work,
        ResearchNodeKind::Pivot,
        ResearchNodeKind::Idea,
        ResearchNodeKind::Finding,
        ResearchNodeKind::LiteratureReview,
        ResearchNodeKind::Analysis,
        ResearchNodeKind::Eureka,
        ResearchNodeKind::Pause,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            ResearchNodeKind::Question => "question",
            ResearchNodeKind::Hypothesis => "hypothesis",
            ResearchNodeKind::Experiment => "experiment",
            ResearchNodeKind::Observation => "observation",
            ResearchNodeKind::Thought => "thought",
            ResearchNodeKind::Work => "work",
            ResearchNodeKind::Pivot => "pivot",
            ResearchNodeKind::Idea => "idea",
            ResearchNodeKind::Finding => "finding",
            ResearchNodeKind::LiteratureReview => "literature-review",
            ResearchNodeKind::Analysis => "analysis",
            ResearchNodeKind::Eureka => "eureka",
            ResearchNodeKind::Pause => "pause",
        }
    }

    pub fn color(&self) -> Palette {
        match self {
            ResearchNodeKind::Question => Palette::Purple,
            ResearchNodeKind::Hypothesis => Palette::Pink,
            ResearchNodeKind::Experiment => Palette::Blue,
            ResearchNodeKind::Observation => Palette::Green,
            ResearchNodeKind::Thought => Palette::Yellow,
            ResearchNodeKind::Work => Palette::Orange,
            ResearchNodeKind::Pivot => Palette::Red,
            ResearchNodeKind::Idea => Palette::Cyan,
            ResearchNodeKind::Finding => Palette::Amber,
            ResearchNodeKind::LiteratureReview => Palette::Indigo,
            ResearchNodeKind::Analysis => Palette::Teal,
            ResearchNodeKind::Eureka => Palette::Rose,
            ResearchNodeKind::Pause => Palette::Slate,
        }
    }

    /// Icon name in the host's icon set
    pub fn icon(&self) -> &'static str {
        match self {
            ResearchNodeKind::Question => "circle-help",
            ResearchNodeKind::Hypothesis => "hand",
            ResearchNodeKind::Experiment => "flask-conical",
            ResearchNodeKind::Observation => "microscope",
            ResearchNodeKind::Thought => "thought",
            ResearchNodeKind::Work => "hammer",
            ResearchNodeKind::Pivot => "undo-2",
            ResearchNodeKind::Idea => "lightbulb",
            ResearchNodeKind::Finding => "star",
            ResearchNodeKind::LiteratureReview => "globe",
            ResearchNodeKind::Analysis => "trending-up",
            ResearchNodeKind::Eureka => "flame",
            ResearchNodeKind::Pause => "circle-pause",
        }
    }
}

impl FromStr for ResearchNodeKind {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResearchNodeKind::ALL
            .iter()
            .copied()
            .find(|k| k.tag() == s)
            .ok_or_else(|| ContentError::UnknownTag {
                kind: "research node",
                tag: s.to_string(),
            })
    }
}

/// Resources a project consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Compute,
    Data,
    Personnel,
    Other,
}

impl ResourceKind {
    pub fn tag(&self) -> &'static str {
        match self {
            ResourceKind::Compute => "compute",
            ResourceKind::Data => "data",
            ResourceKind::Personnel => "personnel",
            ResourceKind::Other => "other",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            ResourceKind::Compute => "cpu",
            ResourceKind::Data => "database",
            ResourceKind::Personnel => "users",
            ResourceKind::Other => "package",
        }
    }

    pub fn color(&self) -> Palette {
        match self {
            ResourceKind::Compute => Palette::Blue,
            ResourceKind::Data => Palette::Green,
            ResourceKind::Personnel => Palette::Purple,
            ResourceKind::Other => Palette::Gray,
        }
    }
}

impl FromStr for ResourceKind {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compute" => Ok(ResourceKind::Compute),
            "data" => Ok(ResourceKind::Data),
            "personnel" => Ok(ResourceKind::Personnel),
            "other" => Ok(ResourceKind::Other),
            _ => Err(ContentError::UnknownTag {
                kind: "resource",
                tag: s.to_string(),
            }),
        }
    }
}

/// A node in a research tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: ResearchNodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub children: Vec<ResearchNode>,
}

impl ResearchNode {
    /// Depth-first count of this node and its descendants
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(ResearchNode::node_count).sum::<usize>()
    }
}
