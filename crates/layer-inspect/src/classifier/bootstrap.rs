//! Two-stage bootstrap training.
//!
//! `raw -> capped -> first fit -> self-consistent -> balanced -> final fit`.
//! Every stage returns a fresh [`TrainingSet`] so each one can be checked on
//! its own.

use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::svm::{fit_linear_svm, Label, LinearModel};
use super::{ClassifyError, SampleStage};
use crate::params::ClassifierParams;
use crate::sampler::ColorSample;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Labelled colour samples: the inspected extruder vs everything else.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrainingSet {
    pub positive: Vec<ColorSample>,
    pub negative: Vec<ColorSample>,
}

/// Sample counts of one stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleCounts {
    pub positive: usize,
    pub negative: usize,
}

impl TrainingSet {
    pub fn new(positive: Vec<ColorSample>, negative: Vec<ColorSample>) -> Self {
        Self { positive, negative }
    }

    pub fn counts(&self) -> SampleCounts {
        SampleCounts {
            positive: self.positive.len(),
            negative: self.negative.len(),
        }
    }

    /// Fail if either class is empty; `refined` picks the stage reported.
    pub fn ensure_trainable(&self, extruder: usize, refined: bool) -> Result<(), ClassifyError> {
        let (pos, neg) = if refined {
            (SampleStage::RefinedPositive, SampleStage::RefinedNegative)
        } else {
            (SampleStage::Positive, SampleStage::Negative)
        };
        if self.positive.is_empty() {
            return Err(ClassifyError::InsufficientSamples {
                extruder,
                stage: pos,
            });
        }
        if self.negative.is_empty() {
            return Err(ClassifyError::InsufficientSamples {
                extruder,
                stage: neg,
            });
        }
        Ok(())
    }

    /// Random subsample without replacement, each class capped at `cap`.
    ///
    /// Kept samples stay in scan order. Positive draws come before negative
    /// draws from the same seeded generator.
    pub fn capped(&self, cap: usize, seed: u64) -> TrainingSet {
        let mut rng = StdRng::seed_from_u64(seed);
        TrainingSet {
            positive: subsample(&self.positive, cap, &mut rng),
            negative: subsample(&self.negative, cap, &mut rng),
        }
    }

    /// Keep only the samples `model` assigns to their assumed class.
    pub fn self_consistent(&self, model: &LinearModel) -> TrainingSet {
        let keep = |samples: &[ColorSample], label: Label| -> Vec<ColorSample> {
            samples
                .iter()
                .copied()
                .filter(|&s| model.predict(s) == label)
                .collect()
        };
        TrainingSet {
            positive: keep(&self.positive, Label::Target),
            negative: keep(&self.negative, Label::Other),
        }
    }

    /// Truncate both classes to the smaller class size.
    pub fn balanced(mut self) -> TrainingSet {
        let n = self.positive.len().min(self.negative.len());
        self.positive.truncate(n);
        self.negative.truncate(n);
        self
    }
}

fn subsample(samples: &[ColorSample], cap: usize, rng: &mut StdRng) -> Vec<ColorSample> {
    if cap == 0 || samples.len() <= cap {
        return samples.to_vec();
    }
    let mut picked = index::sample(rng, samples.len(), cap).into_vec();
    picked.sort_unstable();
    picked.into_iter().map(|i| samples[i]).collect()
}

/// Sample counts at every bootstrap stage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCounts {
    pub raw: SampleCounts,
    pub capped: SampleCounts,
    pub refined: SampleCounts,
    pub balanced: SampleCounts,
}

/// Final classifier plus the first-stage model it was bootstrapped from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassifierFit {
    pub extruder: usize,
    pub first: LinearModel,
    pub model: LinearModel,
    pub counts: StageCounts,
}

/// Run the full bootstrap on the raw positive/negative samples of `extruder`.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(raw, params),
        fields(positive = raw.positive.len(), negative = raw.negative.len())
    )
)]
pub fn train_bootstrap(
    raw: &TrainingSet,
    extruder: usize,
    params: &ClassifierParams,
) -> Result<ClassifierFit, ClassifyError> {
    raw.ensure_trainable(extruder, false)?;

    let capped = raw.capped(params.sample_cap, params.seed);
    let first = fit_linear_svm(&capped.positive, &capped.negative, &params.svm)?;

    let refined = raw.self_consistent(&first);
    log::debug!(
        "extruder {extruder}: first fit kept {}/{} positive, {}/{} negative samples",
        refined.positive.len(),
        raw.positive.len(),
        refined.negative.len(),
        raw.negative.len()
    );
    refined.ensure_trainable(extruder, true)?;
    let refined_counts = refined.counts();

    let balanced = refined.balanced();
    let model = fit_linear_svm(&balanced.positive, &balanced.negative, &params.svm)?;

    Ok(ClassifierFit {
        extruder,
        first,
        model,
        counts: StageCounts {
            raw: raw.counts(),
            capped: capped.counts(),
            refined: refined_counts,
            balanced: balanced.counts(),
        },
    })
}
