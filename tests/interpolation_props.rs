/// Property tests for template interpolation.

use proptest::prelude::*;

use narrative_runtime::core::runtime::Runtime;
use narrative_runtime::core::state::GameState;
use narrative_runtime::schema::content::{plain_text, Fragment};

fn state() -> GameState {
    GameState::with_seed(Runtime::builder().build().unwrap(), 0)
}

proptest! {
    #[test]
    fn brace_free_text_is_identity(text in "[^{}]{0,80}") {
        let fragments = state().interpolate(&text);
        if text.is_empty() {
            prop_assert!(fragments.is_empty());
        } else {
            prop_assert_eq!(fragments, vec![Fragment::Literal(text.clone())]);
        }
    }

    #[test]
    fn doubled_braces_are_literal(inner in "[^{}]{0,40}", before in "[^{}]{0,20}") {
        let template = format!("{}{{{{{}}}}}", before, inner);
        let fragments = state().interpolate(&template);
        prop_assert_eq!(fragments.len(), 1);
        prop_assert_eq!(plain_text(&fragments), format!("{}{{{}}}", before, inner));
    }

    #[test]
    fn unknown_names_degrade_to_markers(
        name in "zz_[a-z]{1,12}",
        chain in prop::option::of("[a-z]{1,8}"),
        before in "[^{}]{0,20}",
        after in "[^{}]{0,20}",
    ) {
        let expr = match &chain {
            Some(chain) => format!("{}:{}", name, chain),
            None => name.clone(),
        };
        let fragments = state().interpolate(&format!("{}{{{}}}{}", before, expr, after));
        let errors: Vec<&Fragment> = fragments.iter().filter(|f| f.is_error()).collect();
        prop_assert_eq!(errors.len(), 1);
        prop_assert_eq!(errors[0].text(), format!("{{{}}}", expr));
        prop_assert_eq!(plain_text(&fragments), format!("{}{{{}}}{}", before, expr, after));
    }

    #[test]
    fn arbitrary_templates_never_panic(template in "[a-z{}():( ]{0,60}") {
        let fragments = state().interpolate(&template);
        for pair in fragments.windows(2) {
            let both_literal = matches!(pair, [Fragment::Literal(_), Fragment::Literal(_)]);
            prop_assert!(!both_literal, "literals not coalesced in {:?}", fragments);
        }
    }
}
