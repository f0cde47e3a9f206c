// Copyright 2026 Wallcheb Contributors
// SPDX-License-Identifier: Apache-2.0

//! Quantum signal processing: the single-qubit response, symmetric phase
//! fitting, convention conversion and the debug circuit.
//!
//! The response is `Re⟨0|U_φ(x)|0⟩` with
//! `U_φ(x) = e^{iφ_0 Z} · Π_k W(x) e^{iφ_k Z}` and
//! `W(x) = [[x, i√(1−x²)], [i√(1−x²), x]]`. A degree-d protocol has d+1
//! phases; the symmetry `φ_k = φ_{d−k}` halves the number fitted.

use num_complex::Complex64;

use crate::circuits::register::RegisterCircuit;
use crate::error::{Result, ValidationError};

type Mat2 = [[Complex64; 2]; 2];

fn mat2_mul(a: &Mat2, b: &Mat2) -> Mat2 {
    let mut out = [[Complex64::new(0.0, 0.0); 2]; 2];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, entry) in row.iter_mut().enumerate() {
            *entry = a[i][0] * b[0][j] + a[i][1] * b[1][j];
        }
    }
    out
}

fn z_phase(phi: f64) -> Mat2 {
    [
        [Complex64::from_polar(1.0, phi), Complex64::new(0.0, 0.0)],
        [Complex64::new(0.0, 0.0), Complex64::from_polar(1.0, -phi)],
    ]
}

fn signal_operator(x: f64) -> Mat2 {
    let s = Complex64::new(0.0, (1.0 - x * x).max(0.0).sqrt());
    let xr = Complex64::new(x, 0.0);
    [[xr, s], [s, xr]]
}

/// `Re⟨0|U_φ(x)|0⟩` for standard phases.
pub fn qsp_response(phases: &[f64], x: f64) -> f64 {
    let mut u = z_phase(phases[0]);
    let w = signal_operator(x);
    for &phi in &phases[1..] {
        u = mat2_mul(&mat2_mul(&u, &w), &z_phase(phi));
    }
    u[0][0].re
}

/// Expand symmetric-reduced phases to the standard d+1 phases.
///
/// For odd d the reduced half mirrors completely; for even d the middle
/// phase is shared.
pub fn expand_symmetric(phi_hat: &[f64], degree: u32) -> Vec<f64> {
    let mut phi = phi_hat.to_vec();
    if degree % 2 == 0 {
        phi.extend(phi_hat.iter().rev().skip(1));
    } else {
        phi.extend(phi_hat.iter().rev());
    }
    phi
}

/// Reduce standard phases to the symmetric half.
pub fn reduce_symmetric(phases: &[f64]) -> Vec<f64> {
    let d_tilde = phases.len().div_ceil(2);
    phases[..d_tilde].to_vec()
}

/// Options for the phase optimiser.
#[derive(Debug, Clone)]
pub struct QspOptimiserOptions {
    /// Iteration cap per starting point.
    pub max_iterations: usize,
    /// Initial learning rate.
    pub learning_rate: f64,
    /// Stop when the loss drops below this.
    pub tolerance: f64,
    /// Finite-difference step for the gradient.
    pub fd_step: f64,
}

impl Default for QspOptimiserOptions {
    fn default() -> Self {
        Self {
            max_iterations: 2000,
            learning_rate: 0.1,
            tolerance: 1e-10,
            fd_step: 1e-6,
        }
    }
}

/// Fit QSP phases to a target polynomial by least squares on the positive
/// Chebyshev root grid.
///
/// The symmetric reduction fits `⌈(d+1)/2⌉` phases bounded to `[−π, π]`,
/// minimised by finite-difference gradient descent with a backtracking
/// learning rate. Two deterministic starts are tried: the π/4-capped
/// default and all-zeros (exact for pure `T_d` targets); the better result
/// wins.
#[derive(Debug, Clone)]
pub struct QspAngleOptimiser {
    degree: u32,
    phases: Vec<f64>,
    residual: f64,
}

impl QspAngleOptimiser {
    pub fn fit(
        degree: u32,
        target: impl Fn(f64) -> f64,
        initial: Option<&[f64]>,
        options: &QspOptimiserOptions,
    ) -> Result<Self> {
        if degree == 0 {
            return Err(ValidationError::Field {
                field: "degree".into(),
                message: "degree must be at least 1".into(),
            }
            .into());
        }
        let n_phases = (degree + 1) as usize;
        if let Some(init) = initial {
            if init.len() != n_phases {
                return Err(ValidationError::Field {
                    field: "initial".into(),
                    message: format!("expected {} phases, got {}", n_phases, init.len()),
                }
                .into());
            }
        }

        let d_tilde = n_phases.div_ceil(2);
        let pi = std::f64::consts::PI;
        let grid: Vec<f64> = (1..=d_tilde)
            .map(|i| ((2 * i - 1) as f64 * pi / (4.0 * d_tilde as f64)).cos())
            .collect();
        let target_vals: Vec<f64> = grid.iter().map(|&x| target(x)).collect();

        let loss = |phi_hat: &[f64]| -> f64 {
            let phases = expand_symmetric(phi_hat, degree);
            grid.iter()
                .zip(target_vals.iter())
                .map(|(&x, &f)| {
                    let diff = qsp_response(&phases, x) - f;
                    diff * diff
                })
                .sum()
        };

        let mut starts: Vec<Vec<f64>> = Vec::new();
        if let Some(init) = initial {
            starts.push(reduce_symmetric(init));
        }
        let mut capped = vec![0.0; n_phases];
        capped[0] = pi / 4.0;
        capped[n_phases - 1] = pi / 4.0;
        starts.push(reduce_symmetric(&capped));
        starts.push(vec![0.0; d_tilde]);

        let mut best_phi = starts[0].clone();
        let mut best_loss = f64::INFINITY;
        for start in starts {
            let (phi, l) = Self::descend(&loss, start, options);
            if l < best_loss {
                best_loss = l;
                best_phi = phi;
            }
        }

        Ok(Self {
            degree,
            phases: expand_symmetric(&best_phi, degree),
            residual: best_loss,
        })
    }

    fn descend(
        loss: &impl Fn(&[f64]) -> f64,
        mut phi: Vec<f64>,
        options: &QspOptimiserOptions,
    ) -> (Vec<f64>, f64) {
        let pi = std::f64::consts::PI;
        let mut lr = options.learning_rate;
        let mut current = loss(&phi);

        for _ in 0..options.max_iterations {
            if current < options.tolerance || lr < 1e-14 {
                break;
            }
            let mut grad = vec![0.0; phi.len()];
            for (k, g) in grad.iter_mut().enumerate() {
                let mut plus = phi.clone();
                let mut minus = phi.clone();
                plus[k] += options.fd_step;
                minus[k] -= options.fd_step;
                *g = (loss(&plus) - loss(&minus)) / (2.0 * options.fd_step);
            }

            let candidate: Vec<f64> = phi
                .iter()
                .zip(grad.iter())
                .map(|(&p, &g)| (p - lr * g).clamp(-pi, pi))
                .collect();
            let candidate_loss = loss(&candidate);
            if candidate_loss < current {
                phi = candidate;
                current = candidate_loss;
                lr *= 1.2;
            } else {
                lr *= 0.5;
            }
        }
        (phi, current)
    }

    pub fn degree(&self) -> u32 {
        self.degree
    }

    /// The fitted standard phases (d+1 of them).
    pub fn phases(&self) -> &[f64] {
        &self.phases
    }

    /// Final least-squares loss.
    pub fn residual(&self) -> f64 {
        self.residual
    }

    /// Evaluate the fitted response.
    pub fn response(&self, x: f64) -> f64 {
        qsp_response(&self.phases, x)
    }
}

/// Convert standard phases to the reflection convention, in half-turns.
///
/// `φ'_1 = φ_0 + φ_d + (d−1)·π/2`, interior phases shift by −π/2, the list
/// reverses and is scaled by −2/π for direct use as Z-rotation half-turns.
pub fn reflection_phases(phases: &[f64]) -> Vec<f64> {
    let pi = std::f64::consts::PI;
    let d = phases.len() - 1;
    let mut converted = Vec::with_capacity(phases.len() - 1);
    converted.push(phases[0] + phases[d] + (d as f64 - 1.0) * pi / 2.0);
    for &p in &phases[1..d] {
        converted.push(p - pi / 2.0);
    }
    converted.reverse();
    converted.iter().map(|&p| -2.0 * p / pi).collect()
}

/// Single-qubit QSP circuit for a concrete signal value.
///
/// `U_φ = e^{iφ_0 Z} Π_k W(a) e^{iφ_k Z}` realised as alternating Rz/Rx
/// rotations, optionally conjugated by Hadamards. `signal` must lie in
/// `[−1, 1]`.
pub fn single_qubit_qsp_circuit(
    phases: &[f64],
    signal: f64,
    apply_hadamards: bool,
) -> Result<RegisterCircuit> {
    if phases.is_empty() {
        return Err(ValidationError::Field {
            field: "phases".into(),
            message: "phase list must not be empty".into(),
        }
        .into());
    }
    if !(-1.0..=1.0).contains(&signal) {
        return Err(ValidationError::Field {
            field: "signal".into(),
            message: format!("signal {} is outside [-1, 1]", signal),
        }
        .into());
    }
    let theta = -2.0 * signal.acos();

    let mut circ = RegisterCircuit::new("U_phi");
    let q = circ.add_register("q", 1)?;
    let qubit = q.qubit(0);

    if apply_hadamards {
        circ.h(qubit.clone())?;
    }
    for &phi in phases.iter().rev().take(phases.len() - 1) {
        circ.rz(-2.0 * phi, qubit.clone())?;
        circ.rx(-theta, qubit.clone())?;
    }
    circ.rz(-2.0 * phases[0], qubit.clone())?;
    if apply_hadamards {
        circ.h(qubit)?;
    }
    Ok(circ)
}

/// One point of a QSP response sweep.
#[derive(Debug, Clone)]
pub struct QspSample {
    pub x: f64,
    pub amp0: Complex64,
    pub amp1: Complex64,
}

/// Sweep the single-qubit QSP circuit over `[-1, 1]`, returning the
/// diagonal unitary amplitudes at each point.
pub fn sweep_single_qubit_qsp(phases: &[f64], n_points: usize) -> Result<Vec<QspSample>> {
    if n_points < 2 {
        return Err(ValidationError::Field {
            field: "n_points".into(),
            message: "sweep needs at least two points".into(),
        }
        .into());
    }
    let mut samples = Vec::with_capacity(n_points);
    for i in 0..n_points {
        let x = -1.0 + 2.0 * i as f64 / (n_points - 1) as f64;
        let circ = single_qubit_qsp_circuit(phases, x, true)?;
        let u = circ.unitary()?;
        samples.push(QspSample {
            x,
            amp0: u[[0, 0]],
            amp1: u[[1, 1]],
        });
    }
    Ok(samples)
}
