use clipqueue_core::{is_similar, TitleIndex, DEFAULT_SIMILARITY_THRESHOLD};

#[test]
fn plural_variant_is_a_near_duplicate() {
    assert!(is_similar(
        "Best Fight Scenes",
        &["Best Fight Scene"],
        DEFAULT_SIMILARITY_THRESHOLD
    ));
}

#[test]
fn unrelated_title_is_not_similar() {
    assert!(!is_similar(
        "Cooking Tutorial",
        &["Best Fight Scene"],
        DEFAULT_SIMILARITY_THRESHOLD
    ));
}

#[test]
fn empty_history_is_never_similar() {
    let existing: [&str; 0] = [];
    assert!(!is_similar("Anything at all", &existing, 0.8));
    assert!(!is_similar("", &existing, 0.0));
}

#[test]
fn word_order_and_case_do_not_matter() {
    assert!(is_similar(
        "scene FIGHT best",
        &["Best Fight Scene"],
        DEFAULT_SIMILARITY_THRESHOLD
    ));
}

#[test]
fn partial_overlap_stays_below_threshold() {
    assert!(!is_similar(
        "Best Fight Scene In Movie History Ranked",
        &["Best Fight Scene"],
        DEFAULT_SIMILARITY_THRESHOLD
    ));
}

#[test]
fn empty_and_whitespace_candidates_do_not_panic() {
    assert!(!is_similar("", &["Best Fight Scene"], 0.8));
    assert!(!is_similar("   \t ", &["Best Fight Scene"], 0.8));
}

#[test]
fn identical_empty_title_counts_as_similar() {
    assert!(is_similar("", &["Best Fight Scene", ""], 0.8));
}

#[test]
fn titles_without_tokens_score_zero() {
    let mut index = TitleIndex::new();
    index.insert("!!!");
    index.insert("a b c");
    assert_eq!(index.best_score("?? !!"), 0.0);
    assert!(!index.is_similar("x y z", 0.5));
}

#[test]
fn slice_helper_agrees_with_incremental_index() {
    let history = [
        "Samurai duel in the rain",
        "Ninja ambush at midnight",
        "Kung fu master training montage",
        "Epic superhero battle finale",
        "Samurai duel under the moon",
    ];
    let candidates = [
        "Samurai duel in rain",
        "Superhero battle finale epic",
        "Cooking pasta at home",
        "Ninja ambush midnight",
        "",
    ];

    let mut index = TitleIndex::new();
    for title in history {
        index.insert(title);
    }
    assert_eq!(index.len(), history.len());

    for candidate in candidates {
        for threshold in [0.3, 0.5, 0.8, 0.95] {
            assert_eq!(
                index.is_similar(candidate, threshold),
                is_similar(candidate, &history, threshold),
                "candidate {candidate:?} at {threshold}"
            );
        }
    }
}

#[test]
fn threshold_controls_the_decision() {
    let existing = ["Samurai duel in the rain"];
    let candidate = "Samurai duel in the snow";
    let mut index = TitleIndex::new();
    index.insert(existing[0]);
    let score = index.best_score(candidate);
    assert!(score > 0.0 && score < 1.0, "score {score}");
    assert!(is_similar(candidate, &existing, score - 0.01));
    assert!(!is_similar(candidate, &existing, score + 0.01));
}

#[test]
fn scores_match_smoothed_tfidf_over_a_shared_corpus() {
    // Reference values: smoothed idf ln((1+n)/(1+df))+1 over history plus
    // candidate, raw term counts, l2-normalised, cosine against each title.
    let history = [
        "samurai duel in the rain",
        "samurai fight night",
        "rain dance the the",
        "kung fu master",
    ];
    let mut index = TitleIndex::new();
    for title in history {
        index.insert(title);
    }

    let expected = [
        ("samurai rain", 0.502822),
        ("fu kung", 0.752040),
        ("night duel the", 0.450594),
        ("cooking pasta", 0.0),
    ];
    for (candidate, score) in expected {
        let actual = index.best_score(candidate);
        assert!(
            (actual - score).abs() < 1e-6,
            "{candidate:?}: expected {score}, got {actual}"
        );
    }
}
