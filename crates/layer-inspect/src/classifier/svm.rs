//! L2-regularised linear SVM (squared hinge loss) solved in the primal.
//!
//! With three colour channels plus a bias the primal has four unknowns, so
//! each Newton step is a 4×4 Cholesky solve. The bias is regularised like the
//! other weights (it is treated as a constant `1.0` feature).

use nalgebra::{DMatrix, DVector, Matrix4, Vector4};
use serde::{Deserialize, Serialize};

use super::ClassifyError;
use crate::params::SvmParams;
use crate::sampler::ColorSample;

/// Class of a colour sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    /// Material of the extruder under inspection (class 0, negative side).
    Target,
    /// Any other extruder's material or background (class 1, positive side).
    Other,
}

impl Label {
    #[inline]
    fn sign(self) -> f64 {
        match self {
            Label::Target => -1.0,
            Label::Other => 1.0,
        }
    }
}

/// Linear decision function `w · x + b` over a colour vector.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub weights: [f64; 3],
    pub bias: f64,
}

impl LinearModel {
    /// Signed margin; negative values lean towards [`Label::Target`].
    #[inline]
    pub fn decision(&self, sample: ColorSample) -> f64 {
        let [w0, w1, w2] = self.weights;
        w0 * sample[0] as f64 + w1 * sample[1] as f64 + w2 * sample[2] as f64 + self.bias
    }

    #[inline]
    pub fn predict(&self, sample: ColorSample) -> Label {
        if self.decision(sample) > 0.0 {
            Label::Other
        } else {
            Label::Target
        }
    }

    /// Decision values for a batch of samples as one matrix-vector product.
    pub fn decision_batch(&self, samples: &[ColorSample]) -> DVector<f64> {
        let x = DMatrix::from_fn(samples.len(), 3, |i, k| samples[i][k] as f64);
        let w = DVector::from_row_slice(&self.weights);
        (x * w).add_scalar(self.bias)
    }
}

#[inline]
fn augmented(sample: ColorSample) -> Vector4<f64> {
    Vector4::new(sample[0] as f64, sample[1] as f64, sample[2] as f64, 1.0)
}

struct Problem<'a> {
    target: &'a [ColorSample],
    other: &'a [ColorSample],
    c: f64,
}

impl Problem<'_> {
    fn labelled(&self) -> impl Iterator<Item = (Vector4<f64>, f64)> + '_ {
        let t = self.target.iter().map(|&s| (augmented(s), Label::Target.sign()));
        let o = self.other.iter().map(|&s| (augmented(s), Label::Other.sign()));
        t.chain(o)
    }

    fn objective(&self, w: &Vector4<f64>) -> f64 {
        let loss: f64 = self
            .labelled()
            .map(|(x, y)| {
                let slack = 1.0 - y * w.dot(&x);
                if slack > 0.0 {
                    slack * slack
                } else {
                    0.0
                }
            })
            .sum();
        0.5 * w.norm_squared() + self.c * loss
    }

    /// Objective, gradient and generalised Hessian at `w`.
    fn evaluate(&self, w: &Vector4<f64>) -> (f64, Vector4<f64>, Matrix4<f64>) {
        let mut loss = 0.0;
        let mut grad = *w;
        let mut hess = Matrix4::identity();
        for (x, y) in self.labelled() {
            let score = w.dot(&x);
            let slack = 1.0 - y * score;
            if slack > 0.0 {
                loss += slack * slack;
                grad += x * (2.0 * self.c * (score - y));
                hess += (x * x.transpose()) * (2.0 * self.c);
            }
        }
        (0.5 * w.norm_squared() + self.c * loss, grad, hess)
    }
}

/// Fit `Target` vs `Other` with a damped Newton method on the primal.
pub fn fit_linear_svm(
    target: &[ColorSample],
    other: &[ColorSample],
    params: &SvmParams,
) -> Result<LinearModel, ClassifyError> {
    const ARMIJO: f64 = 0.01;
    const MIN_STEP: f64 = 1e-10;

    let problem = Problem {
        target,
        other,
        c: params.c,
    };

    let mut w = Vector4::zeros();
    let mut grad0_norm = None;

    for iter in 0..params.max_iter {
        let (f, grad, hess) = problem.evaluate(&w);
        let g_norm = grad.norm();
        let g0 = *grad0_norm.get_or_insert(g_norm);
        if g_norm <= params.tol * g0 || g_norm == 0.0 {
            log::trace!("svm converged after {iter} newton steps (|g|={g_norm:.3e})");
            break;
        }

        let chol = hess.cholesky().ok_or(ClassifyError::Solver)?;
        let dir = chol.solve(&(-grad));
        let slope = grad.dot(&dir);

        let mut step = 1.0;
        let next = loop {
            let candidate = w + dir * step;
            if problem.objective(&candidate) <= f + ARMIJO * step * slope {
                break Some(candidate);
            }
            step *= 0.5;
            if step < MIN_STEP {
                break None;
            }
        };
        match next {
            Some(candidate) => w = candidate,
            None => break,
        }
    }

    Ok(LinearModel {
        weights: [w[0], w[1], w[2]],
        bias: w[3],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blobs() -> (Vec<ColorSample>, Vec<ColorSample>) {
        let mut target = Vec::new();
        let mut other = Vec::new();
        for i in 0..20u8 {
            target.push([200 + i, 40 + i, 30]);
            other.push([30, 40 + i, 190 + i]);
        }
        (target, other)
    }

    #[test]
    fn separates_two_colour_blobs() {
        let (target, other) = blobs();
        let model = fit_linear_svm(&target, &other, &SvmParams::default()).expect("fit");
        assert!(target.iter().all(|&s| model.predict(s) == Label::Target));
        assert!(other.iter().all(|&s| model.predict(s) == Label::Other));
        assert!(model.decision([255, 50, 0]) < -1.0);
        assert!(model.decision([0, 50, 255]) > 1.0);
    }

    #[test]
    fn batch_decision_matches_scalar() {
        let model = LinearModel {
            weights: [0.5, -0.25, 0.125],
            bias: -3.0,
        };
        let samples = [[0, 0, 0], [10, 20, 30], [255, 128, 7]];
        let batch = model.decision_batch(&samples);
        for (i, &s) in samples.iter().enumerate() {
            assert!((batch[i] - model.decision(s)).abs() < 1e-12);
        }
    }

    #[test]
    fn gradient_vanishes_at_solution() {
        let (target, other) = blobs();
        let params = SvmParams {
            tol: 1e-8,
            ..SvmParams::default()
        };
        let model = fit_linear_svm(&target, &other, &params).expect("fit");
        let problem = Problem {
            target: &target,
            other: &other,
            c: params.c,
        };
        let w = Vector4::new(
            model.weights[0],
            model.weights[1],
            model.weights[2],
            model.bias,
        );
        let (_, g0, _) = problem.evaluate(&Vector4::zeros());
        let (_, g, _) = problem.evaluate(&w);
        assert!(g.norm() <= 1e-4 * g0.norm());
    }

    #[test]
    fn zero_decision_is_target() {
        let model = LinearModel {
            weights: [0.0; 3],
            bias: 0.0,
        };
        assert_eq!(model.predict([1, 2, 3]), Label::Target);
    }
}
