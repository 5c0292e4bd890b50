// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Template matcher boundary.
//!
//! The alarm loop only needs "where does the template fit best inside this
//! search window, and how well". Concrete correlation algorithms, and test
//! doubles returning scripted scores, sit behind the `Matcher` trait.

use crate::models::settings::MatcherKind;
use anyhow::Result;
use image::GrayImage;

/// Best placement of the template inside the search window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchResult {
    /// Top-left corner of the best placement, relative to the search window.
    pub location: (u32, u32),
    /// Normalized correlation, higher is more similar, at most 1.0.
    pub score: f64,
}

/// Finds a template inside a search window.
pub trait Matcher {
    /// Locate `template` inside `search`.
    ///
    /// `mask`, when present, has the template's dimensions; zero-valued
    /// pixels are left out of the score.
    fn find_best(
        &mut self,
        search: &GrayImage,
        template: &GrayImage,
        mask: Option<&GrayImage>,
    ) -> Result<MatchResult>;

    fn name(&self) -> &'static str;
}

/// Similarity percentage shown to the user: `floor(max(0, score) * 100)`.
pub fn similarity_percent(score: f64) -> u32 {
    (score.max(0.0) * 100.0).floor().min(100.0) as u32
}

/// Build the matcher selected in the settings.
pub fn create_matcher(kind: MatcherKind) -> Box<dyn Matcher> {
    match kind {
        MatcherKind::Zncc => Box::new(super::zncc::ZnccMatcher::default()),
        #[cfg(feature = "video-opencv")]
        MatcherKind::Opencv => Box::new(super::opencv_matcher::OpencvMatcher),
        #[cfg(not(feature = "video-opencv"))]
        MatcherKind::Opencv => {
            log::warn!(
                "OpenCV matcher requested but the video-opencv feature is disabled, using ZNCC"
            );
            Box::new(super::zncc::ZnccMatcher::default())
        }
    }
}

#[cfg(test)]
pub mod testing {
    //! Matcher doubles for loop tests.

    use super::*;
    use anyhow::bail;
    use std::collections::VecDeque;

    /// Returns scripted results in order, repeating the last one.
    pub struct ScriptedMatcher {
        results: VecDeque<Result<MatchResult, String>>,
        last: Option<Result<MatchResult, String>>,
        pub calls: usize,
        /// Dimensions of the inputs seen on the latest call.
        pub last_inputs: Option<((u32, u32), (u32, u32), Option<(u32, u32)>)>,
    }

    impl ScriptedMatcher {
        pub fn new(results: Vec<Result<MatchResult, String>>) -> Self {
            Self {
                results: results.into(),
                last: None,
                calls: 0,
                last_inputs: None,
            }
        }

        pub fn scoring(score: f64, location: (u32, u32)) -> Self {
            Self::new(vec![Ok(MatchResult { location, score })])
        }
    }

    impl Matcher for ScriptedMatcher {
        fn find_best(
            &mut self,
            search: &GrayImage,
            template: &GrayImage,
            mask: Option<&GrayImage>,
        ) -> Result<MatchResult> {
            self.calls += 1;
            self.last_inputs = Some((
                search.dimensions(),
                template.dimensions(),
                mask.map(|m| m.dimensions()),
            ));
            if let Some(next) = self.results.pop_front() {
                self.last = Some(next);
            }
            match &self.last {
                Some(Ok(result)) => Ok(*result),
                Some(Err(message)) => bail!("{}", message),
                None => bail!("no scripted result"),
            }
        }

        fn name(&self) -> &'static str {
            "scripted"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_similarity_percent() {
        assert_eq!(similarity_percent(0.873), 87);
        assert_eq!(similarity_percent(-0.2), 0);
        assert_eq!(similarity_percent(1.0), 100);
        assert_eq!(similarity_percent(0.0), 0);
        assert_eq!(similarity_percent(0.5), 50);
        assert_eq!(similarity_percent(0.999), 99);
    }

    #[test]
    fn test_create_matcher_default() {
        let matcher = create_matcher(MatcherKind::Zncc);
        assert_eq!(matcher.name(), "zncc");
    }
}
