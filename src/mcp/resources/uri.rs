pub const SCHEME: &str = "novelgame://";

/// A resource address under `novelgame://`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NovelResource {
    /// `novelgame://stories`
    Stories,
    /// `novelgame://story/{story_id}/meta`
    StoryMeta(String),
    /// `novelgame://story/{story_id}/images`
    StoryImages(String),
    /// `novelgame://story/{story_id}/state`
    StoryState(String),
    /// `novelgame://story/{story_id}/scenes/{scene_id}`
    Scene { story_id: String, scene_id: String },
    /// `novelgame://player/{player_id}/path`
    PlayerPath(String),
    /// `novelgame://log/{story_id}`
    StoryLog(String),
}

fn segment(s: &str) -> Option<String> {
    (!s.is_empty() && !s.contains('/')).then(|| s.to_string())
}

impl NovelResource {
    pub fn parse(uri: &str) -> Option<Self> {
        let rest = uri.strip_prefix(SCHEME)?;
        if rest == "stories" {
            return Some(Self::Stories);
        }
        if let Some(story_id) = rest.strip_prefix("log/") {
            return segment(story_id).map(Self::StoryLog);
        }
        if let Some(player) = rest.strip_prefix("player/") {
            return segment(player.strip_suffix("/path")?).map(Self::PlayerPath);
        }

        let story = rest.strip_prefix("story/")?;
        let (story_id, tail) = story.split_once('/')?;
        let story_id = segment(story_id)?;
        match tail {
            "meta" => Some(Self::StoryMeta(story_id)),
            "images" => Some(Self::StoryImages(story_id)),
            "state" => Some(Self::StoryState(story_id)),
            _ => {
                let scene_id = segment(tail.strip_prefix("scenes/")?)?;
                Some(Self::Scene { story_id, scene_id })
            }
        }
    }

    pub fn uri(&self) -> String {
        match self {
            Self::Stories => format!("{SCHEME}stories"),
            Self::StoryMeta(id) => format!("{SCHEME}story/{id}/meta"),
            Self::StoryImages(id) => format!("{SCHEME}story/{id}/images"),
            Self::StoryState(id) => format!("{SCHEME}story/{id}/state"),
            Self::Scene { story_id, scene_id } => {
                format!("{SCHEME}story/{story_id}/scenes/{scene_id}")
            }
            Self::PlayerPath(id) => format!("{SCHEME}player/{id}/path"),
            Self::StoryLog(id) => format!("{SCHEME}log/{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_known_uris() {
        let cases = [
            ("novelgame://stories", NovelResource::Stories),
            (
                "novelgame://story/ghost/meta",
                NovelResource::StoryMeta("ghost".into()),
            ),
            (
                "novelgame://story/ghost/images",
                NovelResource::StoryImages("ghost".into()),
            ),
            (
                "novelgame://story/ghost/state",
                NovelResource::StoryState("ghost".into()),
            ),
            (
                "novelgame://story/ghost/scenes/intro",
                NovelResource::Scene {
                    story_id: "ghost".into(),
                    scene_id: "intro".into(),
                },
            ),
            (
                "novelgame://player/p1/path",
                NovelResource::PlayerPath("p1".into()),
            ),
            ("novelgame://log/ghost", NovelResource::StoryLog("ghost".into())),
        ];
        for (uri, expected) in cases {
            let parsed = NovelResource::parse(uri);
            assert_eq!(parsed.as_ref(), Some(&expected), "{uri}");
            assert_eq!(expected.uri(), uri);
        }
    }

    #[test]
    fn test_rejects_malformed_uris() {
        for uri in [
            "other://stories",
            "novelgame://",
            "novelgame://story/ghost",
            "novelgame://story//meta",
            "novelgame://story/ghost/scenes/",
            "novelgame://story/ghost/scenes/a/b",
            "novelgame://player/p1",
            "novelgame://log/",
            "novelgame://story/ghost/unknown",
        ] {
            assert_eq!(NovelResource::parse(uri), None, "{uri}");
        }
    }
}
