use crate::domain::entities::Recommendation;

// Fixed purpose vocabulary offered by the recommendation wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    Fragrance,
    Compost,
    Deodorizer,
    Craft,
    Fertilizer,
    Cleaner,
}

impl Purpose {
    pub const ALL: [Purpose; 6] = [
        Purpose::Fragrance,
        Purpose::Compost,
        Purpose::Deodorizer,
        Purpose::Craft,
        Purpose::Fertilizer,
        Purpose::Cleaner,
    ];

    // Canonical value sent to the backend.
    pub fn label(self) -> &'static str {
        match self {
            Purpose::Fragrance => "방향제",
            Purpose::Compost => "퇴비",
            Purpose::Deodorizer => "탈취제",
            Purpose::Craft => "공예",
            Purpose::Fertilizer => "비료",
            Purpose::Cleaner => "세정제",
        }
    }

    pub fn label_key(self) -> &'static str {
        match self {
            Purpose::Fragrance => "chat.purpose.fragrance",
            Purpose::Compost => "chat.purpose.compost",
            Purpose::Deodorizer => "chat.purpose.deodorizer",
            Purpose::Craft => "chat.purpose.craft",
            Purpose::Fertilizer => "chat.purpose.fertilizer",
            Purpose::Cleaner => "chat.purpose.cleaner",
        }
    }

    fn synonyms(self) -> &'static [&'static str] {
        match self {
            Purpose::Fragrance => &["방향제", "fragrance", "air freshener"],
            Purpose::Compost => &["퇴비", "compost"],
            Purpose::Deodorizer => &["탈취제", "deodorizer", "deodorant"],
            Purpose::Craft => &["공예", "craft", "crafts"],
            Purpose::Fertilizer => &["비료", "fertilizer"],
            Purpose::Cleaner => &["세정제", "cleaner", "scrub"],
        }
    }

    // Case-insensitive match against the vocabulary.
    pub fn match_text(text: &str) -> Option<Purpose> {
        let needle = text.trim().to_lowercase();
        Purpose::ALL
            .iter()
            .copied()
            .find(|purpose| purpose.synonyms().iter().any(|s| *s == needle))
    }

    // Matched purposes are canonicalized; anything else is kept literally.
    pub fn resolve(text: &str) -> String {
        match Purpose::match_text(text) {
            Some(purpose) => purpose.label().to_string(),
            None => text.to_string(),
        }
    }
}

// How a generation attempt ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Generated {
        primary: Recommendation,
        alternates: Vec<Recommendation>,
        // 0 is the primary, n is alternates[n - 1].
        shown: usize,
    },
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WizardState {
    AskingPurpose,
    AskingMaterial {
        purpose: String,
    },
    Generating {
        purpose: String,
        material: String,
    },
    Ready {
        purpose: String,
        material: String,
        outcome: Outcome,
    },
}

// Inputs the wizard reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum WizardEvent {
    Text(String),
    PickPurpose(Purpose),
    Generated {
        primary: Recommendation,
        alternates: Vec<Recommendation>,
    },
    GenerationFailed,
    ViewAlternate,
    Regenerate,
    Restart,
}

impl WizardState {
    // One arm per legal transition; anything else leaves the state untouched.
    pub fn on(self, event: WizardEvent) -> WizardState {
        match (self, event) {
            (_, WizardEvent::Restart) => WizardState::AskingPurpose,
            (WizardState::AskingPurpose, WizardEvent::Text(text))
            | (WizardState::Ready { .. }, WizardEvent::Text(text)) => WizardState::AskingMaterial {
                purpose: Purpose::resolve(&text),
            },
            (WizardState::AskingPurpose, WizardEvent::PickPurpose(purpose)) => {
                WizardState::AskingMaterial {
                    purpose: purpose.label().to_string(),
                }
            }
            (WizardState::AskingMaterial { purpose }, WizardEvent::Text(material)) => {
                WizardState::Generating { purpose, material }
            }
            (
                WizardState::Generating { purpose, material },
                WizardEvent::Generated {
                    primary,
                    alternates,
                },
            ) => WizardState::Ready {
                purpose,
                material,
                outcome: Outcome::Generated {
                    primary,
                    alternates,
                    shown: 0,
                },
            },
            (WizardState::Generating { purpose, material }, WizardEvent::GenerationFailed) => {
                WizardState::Ready {
                    purpose,
                    material,
                    outcome: Outcome::Failed,
                }
            }
            (
                WizardState::Ready {
                    purpose,
                    material,
                    outcome:
                        Outcome::Generated {
                            primary,
                            alternates,
                            shown,
                        },
                },
                WizardEvent::ViewAlternate,
            ) if !alternates.is_empty() => {
                let shown = (shown + 1) % (alternates.len() + 1);
                WizardState::Ready {
                    purpose,
                    material,
                    outcome: Outcome::Generated {
                        primary,
                        alternates,
                        shown,
                    },
                }
            }
            (WizardState::Ready { purpose, material, .. }, WizardEvent::Regenerate) => {
                WizardState::Generating { purpose, material }
            }
            (state, event) => {
                tracing::debug!(?event, "wizard event ignored in current state");
                state
            }
        }
    }

    // Recommendation currently on display, if any.
    pub fn shown_recommendation(&self) -> Option<&Recommendation> {
        match self {
            WizardState::Ready {
                outcome:
                    Outcome::Generated {
                        primary,
                        alternates,
                        shown,
                    },
                ..
            } => match *shown {
                0 => Some(primary),
                n => alternates.get(n - 1),
            },
            _ => None,
        }
    }

    // Position of the shown result: 0 is the primary, n is alternates[n - 1].
    pub fn shown_index(&self) -> Option<usize> {
        match self {
            WizardState::Ready {
                outcome: Outcome::Generated { shown, .. },
                ..
            } => Some(*shown),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WizardState::AskingPurpose => "asking_purpose",
            WizardState::AskingMaterial { .. } => "asking_material",
            WizardState::Generating { .. } => "generating",
            WizardState::Ready { .. } => "ready",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: &str) -> Recommendation {
        Recommendation {
            id: id.to_string(),
            title: format!("title {id}"),
            description: String::new(),
            tags: Vec::new(),
            difficulty: String::new(),
            duration: String::new(),
            materials: Vec::new(),
            steps: Vec::new(),
        }
    }

    fn ready_with(alternates: Vec<Recommendation>) -> WizardState {
        WizardState::Generating {
            purpose: "방향제".into(),
            material: "케냐".into(),
        }
        .on(WizardEvent::Generated {
            primary: rec("main"),
            alternates,
        })
    }

    #[test]
    fn purpose_matching_ignores_case_and_surrounding_space() {
        assert_eq!(Purpose::match_text("  Fragrance "), Some(Purpose::Fragrance));
        assert_eq!(Purpose::match_text("방향제"), Some(Purpose::Fragrance));
        assert_eq!(Purpose::match_text("candle"), None);
    }

    #[test]
    fn unmatched_purpose_is_kept_literally() {
        assert_eq!(Purpose::resolve("COMPOST"), "퇴비");
        assert_eq!(Purpose::resolve("scented candle"), "scented candle");
    }

    #[test]
    fn text_walks_purpose_then_material() {
        let state = WizardState::AskingPurpose.on(WizardEvent::Text("deodorizer".into()));
        assert_eq!(
            state,
            WizardState::AskingMaterial {
                purpose: "탈취제".into()
            }
        );

        let state = state.on(WizardEvent::Text("Ethiopia Yirgacheffe".into()));
        assert_eq!(
            state,
            WizardState::Generating {
                purpose: "탈취제".into(),
                material: "Ethiopia Yirgacheffe".into()
            }
        );
    }

    #[test]
    fn text_in_ready_restarts_the_cycle_with_new_purpose() {
        let state = ready_with(Vec::new()).on(WizardEvent::Text("비료".into()));

        assert_eq!(
            state,
            WizardState::AskingMaterial {
                purpose: "비료".into()
            }
        );
    }

    #[test]
    fn generation_failure_still_reaches_ready() {
        let state = WizardState::Generating {
            purpose: "공예".into(),
            material: "브라질".into(),
        }
        .on(WizardEvent::GenerationFailed);

        assert!(matches!(
            state,
            WizardState::Ready {
                outcome: Outcome::Failed,
                ..
            }
        ));
        assert_eq!(state.shown_recommendation(), None);
    }

    #[test]
    fn view_alternate_cycles_back_to_primary() {
        let state = ready_with(vec![rec("alt-1"), rec("alt-2")]);
        assert_eq!(state.shown_recommendation().map(|r| r.id.as_str()), Some("main"));

        let state = state.on(WizardEvent::ViewAlternate);
        assert_eq!(state.shown_recommendation().map(|r| r.id.as_str()), Some("alt-1"));

        let state = state.on(WizardEvent::ViewAlternate).on(WizardEvent::ViewAlternate);
        assert_eq!(state.shown_recommendation().map(|r| r.id.as_str()), Some("main"));
    }

    #[test]
    fn view_alternate_without_alternates_is_ignored() {
        let state = ready_with(Vec::new());

        assert_eq!(state.clone().on(WizardEvent::ViewAlternate), state);
    }

    #[test]
    fn regenerate_keeps_inputs() {
        let state = ready_with(Vec::new()).on(WizardEvent::Regenerate);

        assert_eq!(
            state,
            WizardState::Generating {
                purpose: "방향제".into(),
                material: "케냐".into()
            }
        );
    }

    #[test]
    fn restart_is_accepted_everywhere() {
        for state in [
            WizardState::AskingMaterial {
                purpose: "퇴비".into(),
            },
            ready_with(Vec::new()),
        ] {
            assert_eq!(state.on(WizardEvent::Restart), WizardState::AskingPurpose);
        }
    }

    #[test]
    fn generated_result_outside_generating_is_ignored() {
        let state = WizardState::AskingPurpose.on(WizardEvent::Generated {
            primary: rec("x"),
            alternates: Vec::new(),
        });

        assert_eq!(state, WizardState::AskingPurpose);
    }
}
