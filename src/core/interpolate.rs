/// Text interpolation: `{expression}` placeholders resolved through scripts.
use log::warn;

use crate::core::state::GameState;
use crate::schema::content::Fragment;

/// A piece of a scanned template, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    /// Literal text with escapes already applied.
    Literal(String),
    /// The trimmed text between `{` and `}`.
    Placeholder(String),
}

/// Split a template into literal runs and placeholders.
///
/// Syntax:
/// - `{{` → literal `{`, `}}` → literal `}`
/// - `{expr}` → placeholder; the first `}` closes it
/// - `{` with no closing `}` → literal text, as is a lone `}`
///
/// Adjacent literal text is always coalesced into one piece.
pub fn scan(input: &str) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut literal_buf = String::new();
    let chars: Vec<char> = input.chars().collect();
    let len = chars.len();
    let mut i = 0;

    while i < len {
        match chars[i] {
            '{' if i + 1 < len && chars[i + 1] == '{' => {
                literal_buf.push('{');
                i += 2;
            }
            '}' if i + 1 < len && chars[i + 1] == '}' => {
                literal_buf.push('}');
                i += 2;
            }
            '{' => {
                let start = i + 1;
                let Some(offset) = chars[start..].iter().position(|&c| c == '}') else {
                    // Unterminated: the rest of the input is literal.
                    literal_buf.extend(&chars[i..]);
                    break;
                };
                let end = start + offset;
                if !literal_buf.is_empty() {
                    pieces.push(Piece::Literal(std::mem::take(&mut literal_buf)));
                }
                let content: String = chars[start..end].iter().collect();
                pieces.push(Piece::Placeholder(content.trim().to_string()));
                i = end + 1;
            }
            c => {
                literal_buf.push(c);
                i += 1;
            }
        }
    }

    if !literal_buf.is_empty() {
        pieces.push(Piece::Literal(literal_buf));
    }
    pieces
}

impl GameState {
    /// Interpolate a template into display fragments.
    ///
    /// Placeholders that fail to resolve for any reason become
    /// [`Fragment::Error`] markers; this never fails for content reasons.
    pub fn interpolate(&mut self, template: &str) -> Vec<Fragment> {
        scan(template)
            .into_iter()
            .map(|piece| match piece {
                Piece::Literal(text) => Fragment::Literal(text),
                Piece::Placeholder(expr) => {
                    match self.resolve(&expr).and_then(|out| out.into_inline()) {
                        Ok(inline) => Fragment::Resolved(inline),
                        Err(e) => {
                            warn!("placeholder {{{}}} failed: {}", expr, e);
                            Fragment::error_for(&expr, &self.config().error_color)
                        }
                    }
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::EngineConfig;
    use crate::core::registry::ScriptRegistry;
    use crate::core::resolver::Output;
    use crate::core::runtime::Runtime;
    use crate::schema::content::Inline;

    fn state() -> GameState {
        let mut scripts = ScriptRegistry::new();
        scripts
            .register("hero", |_, _| Ok(Output::styled("Ash", "gold")))
            .unwrap();
        GameState::with_seed(Runtime::builder().with_scripts(scripts).build().unwrap(), 7)
    }

    #[test]
    fn scan_literal_only() {
        assert_eq!(
            scan("Hello, world."),
            vec![Piece::Literal("Hello, world.".to_string())]
        );
        assert!(scan("").is_empty());
    }

    #[test]
    fn scan_placeholder_is_trimmed() {
        assert_eq!(
            scan("a{ hero }b"),
            vec![
                Piece::Literal("a".to_string()),
                Piece::Placeholder("hero".to_string()),
                Piece::Literal("b".to_string()),
            ]
        );
    }

    #[test]
    fn scan_escapes_coalesce() {
        assert_eq!(
            scan("Use {{pc}} for names"),
            vec![Piece::Literal("Use {pc} for names".to_string())]
        );
    }

    #[test]
    fn scan_unterminated_and_lone_close_are_literal() {
        assert_eq!(
            scan("Unclosed { brace"),
            vec![Piece::Literal("Unclosed { brace".to_string())]
        );
        assert_eq!(scan("a } b"), vec![Piece::Literal("a } b".to_string())]);
    }

    #[test]
    fn scan_adjacent_placeholders() {
        assert_eq!(
            scan("{a}{b}"),
            vec![
                Piece::Placeholder("a".to_string()),
                Piece::Placeholder("b".to_string()),
            ]
        );
    }

    #[test]
    fn three_fragments_around_placeholder() {
        let mut s = state();
        let fragments = s.interpolate("Hello {hero}!");
        assert_eq!(
            fragments,
            vec![
                Fragment::Literal("Hello ".to_string()),
                Fragment::Resolved(Inline::Styled {
                    text: "Ash".to_string(),
                    color: "gold".to_string(),
                }),
                Fragment::Literal("!".to_string()),
            ]
        );
    }

    #[test]
    fn empty_placeholder_is_error_marker() {
        let mut s = state();
        let fragments = s.interpolate("Empty {} here");
        assert_eq!(fragments.len(), 3);
        assert_eq!(fragments[1], Fragment::error_for("", "red"));
    }

    #[test]
    fn unknown_name_is_error_marker() {
        let mut s = state();
        let fragments = s.interpolate("{villain} laughs");
        assert!(fragments[0].is_error());
        assert_eq!(fragments[0].text(), "{villain}");
    }

    #[test]
    fn error_marker_takes_configured_color() {
        let mut s = state();
        assert!(matches!(
            &s.interpolate("{villain}")[0],
            Fragment::Error { color, .. } if color == "red"
        ));

        let config = EngineConfig {
            error_color: "magenta".to_string(),
            ..EngineConfig::default()
        };
        let runtime = Runtime::builder().config(config).build().unwrap();
        let mut s = GameState::with_seed(runtime, 1);
        assert_eq!(
            s.interpolate("{villain}"),
            vec![Fragment::error_for("villain", "magenta")]
        );
    }

    #[test]
    fn unclosed_brace_is_single_literal() {
        let mut s = state();
        assert_eq!(
            s.interpolate("Unclosed { brace"),
            vec![Fragment::Literal("Unclosed { brace".to_string())]
        );
    }
}
