//! Heuristic ranking of candidate subtitle files.

use tracing::debug;

/// Metadata describing a subtitle file available for download, not yet
/// retrieved. Produced by the search client; read-only here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateDescriptor {
    pub release_name: String,
    pub comment_text: String,
    pub download_count: u64,
    /// Opaque handle for later retrieval through the download endpoint.
    pub file_id: u64,
}

/// Weights of the dub-detection heuristic. The keyword list comes from
/// configuration; the weights default to the tuned values but are parameters
/// so the scoring stays testable in isolation.
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    /// Added when a keyword appears in the release name.
    pub release_match: f64,
    /// Added when a keyword appears in the uploader comment.
    pub comment_match: f64,
    /// Downloads needed per point of popularity bonus.
    pub downloads_per_point: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            release_match: 10.0,
            comment_match: 5.0,
            downloads_per_point: 10_000.0,
        }
    }
}

/// Score one candidate for the dub role.
///
/// Keyword matches are case-folded substring checks; the popularity bonus is
/// fractional and uncapped, so it breaks ties between equally keyword-matched
/// candidates without ever outranking a keyword match on its own until the
/// download count is enormous.
pub fn score_dub_candidate(
    candidate: &CandidateDescriptor,
    keywords: &[String],
    weights: &ScoringWeights,
) -> f64 {
    let release = candidate.release_name.to_lowercase();
    let comment = candidate.comment_text.to_lowercase();

    let mut score = 0.0;
    if keywords.iter().any(|k| release.contains(&k.to_lowercase())) {
        score += weights.release_match;
    }
    if keywords.iter().any(|k| comment.contains(&k.to_lowercase())) {
        score += weights.comment_match;
    }
    score += candidate.download_count as f64 / weights.downloads_per_point;

    score
}

/// Pick the best dub-role candidate, or `None` if the list is empty.
///
/// The strictly highest score wins, ties going to the earliest candidate in
/// input order. When no candidate scores above zero (no keyword hit anywhere
/// and zero downloads across the board), selection falls back to the plain
/// download-count ranking so the choice stays deterministic.
pub fn select_dub_candidate<'a>(
    candidates: &'a [CandidateDescriptor],
    keywords: &[String],
    weights: &ScoringWeights,
) -> Option<&'a CandidateDescriptor> {
    let mut best: Option<(&CandidateDescriptor, f64)> = None;

    for candidate in candidates {
        let score = score_dub_candidate(candidate, keywords, weights);
        debug!(
            "Candidate '{}' scored {:.3} ({} downloads)",
            candidate.release_name, score, candidate.download_count
        );
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((candidate, score)),
        }
    }

    match best {
        Some((_, best_score)) if best_score <= 0.0 => {
            debug!("No heuristic signal fired; falling back to download count");
            select_original_candidate(candidates)
        }
        Some((candidate, _)) => Some(candidate),
        None => None,
    }
}

/// Pick the best original-role candidate: simply the most downloaded one,
/// ties going to the earliest in input order. `None` only for an empty list.
pub fn select_original_candidate(
    candidates: &[CandidateDescriptor],
) -> Option<&CandidateDescriptor> {
    let mut best: Option<&CandidateDescriptor> = None;

    for candidate in candidates {
        match best {
            Some(b) if candidate.download_count <= b.download_count => {}
            _ => best = Some(candidate),
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(release: &str, comment: &str, downloads: u64) -> CandidateDescriptor {
        CandidateDescriptor {
            release_name: release.to_string(),
            comment_text: comment.to_string(),
            download_count: downloads,
            file_id: 0,
        }
    }

    fn keywords(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_score_release_name_match() {
        let weights = ScoringWeights::default();
        let c = candidate("Movie.2020.DUBBED.1080p", "", 0);

        let score = score_dub_candidate(&c, &keywords(&["dub"]), &weights);
        assert_eq!(score, 10.0);
    }

    #[test]
    fn test_score_comment_match() {
        let weights = ScoringWeights::default();
        let c = candidate("Movie.2020.1080p", "this is the dubbed version", 0);

        let score = score_dub_candidate(&c, &keywords(&["dubbed"]), &weights);
        assert_eq!(score, 5.0);
    }

    #[test]
    fn test_score_is_case_insensitive() {
        let weights = ScoringWeights::default();
        let c = candidate("movie.szinkron.720p", "", 0);

        let score = score_dub_candidate(&c, &keywords(&["SZINKRON"]), &weights);
        assert_eq!(score, 10.0);
    }

    #[test]
    fn test_score_popularity_bonus() {
        let weights = ScoringWeights::default();
        let c = candidate("Movie.720p", "", 1500);

        let score = score_dub_candidate(&c, &keywords(&["dub"]), &weights);
        assert!((score - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_score_monotonic_in_downloads() {
        let weights = ScoringWeights::default();
        let kw = keywords(&["dub"]);
        let low = candidate("Movie.Dub", "", 100);
        let high = candidate("Movie.Dub", "", 10_000);

        assert!(
            score_dub_candidate(&high, &kw, &weights) >= score_dub_candidate(&low, &kw, &weights)
        );
    }

    #[test]
    fn test_release_match_beats_comment_match() {
        let kw = keywords(&["dub"]);
        let release_hit = candidate("Movie.Dub.Hun", "", 500);
        let comment_hit = candidate("Movie.1080p", "dub audio track", 500);

        let candidates = vec![comment_hit, release_hit];
        let chosen = select_dub_candidate(&candidates, &kw, &ScoringWeights::default()).unwrap();

        assert_eq!(chosen.release_name, "Movie.Dub.Hun");
    }

    #[test]
    fn test_keyword_match_beats_raw_popularity() {
        // From the field: a keyword hit must win against a far more popular
        // candidate with no dub signal at all
        let kw = keywords(&["dub"]);
        let candidates = vec![
            candidate("Movie.720p", "", 100),
            candidate("Movie.Dub.Hun", "", 50),
            candidate("Movie.IMAX", "", 1500),
        ];

        let chosen = select_dub_candidate(&candidates, &kw, &ScoringWeights::default()).unwrap();
        assert_eq!(chosen.release_name, "Movie.Dub.Hun");
    }

    #[test]
    fn test_no_signal_falls_back_to_downloads() {
        let kw = keywords(&["dub"]);
        let candidates = vec![
            candidate("A", "", 0),
            candidate("B", "", 0),
            candidate("C", "", 0),
        ];

        // All scores are exactly zero, so the fallback picks by download
        // count with ties resolved to the first candidate
        let chosen = select_dub_candidate(&candidates, &kw, &ScoringWeights::default()).unwrap();
        assert_eq!(chosen.release_name, "A");
    }

    #[test]
    fn test_popularity_alone_is_a_signal() {
        let kw = keywords(&["dub"]);
        let candidates = vec![candidate("A", "", 200), candidate("B", "", 900)];

        let chosen = select_dub_candidate(&candidates, &kw, &ScoringWeights::default()).unwrap();
        assert_eq!(chosen.release_name, "B");
    }

    #[test]
    fn test_ties_resolve_to_input_order() {
        let kw = keywords(&["dub"]);
        let candidates = vec![
            candidate("First.Dub", "", 300),
            candidate("Second.Dub", "", 300),
        ];

        let chosen = select_dub_candidate(&candidates, &kw, &ScoringWeights::default()).unwrap();
        assert_eq!(chosen.release_name, "First.Dub");
    }

    #[test]
    fn test_select_original_by_downloads() {
        let candidates = vec![
            candidate("A", "", 10),
            candidate("B", "", 5000),
            candidate("C.Dub", "", 100),
        ];

        let chosen = select_original_candidate(&candidates).unwrap();
        assert_eq!(chosen.release_name, "B");
    }

    #[test]
    fn test_select_original_tie_to_first() {
        let candidates = vec![candidate("A", "", 42), candidate("B", "", 42)];

        let chosen = select_original_candidate(&candidates).unwrap();
        assert_eq!(chosen.release_name, "A");
    }

    #[test]
    fn test_empty_list_selects_nothing() {
        assert!(select_dub_candidate(&[], &keywords(&["dub"]), &ScoringWeights::default())
            .is_none());
        assert!(select_original_candidate(&[]).is_none());
    }
}
