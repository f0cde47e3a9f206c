// Copyright 2026 Wallcheb Contributors
// SPDX-License-Identifier: Apache-2.0

//! Register-structured circuits.
//!
//! A [`RegisterCircuit`] owns named qubit registers and a gate list. Boxes
//! (see [`crate::circuits::boxes`]) are wired onto a circuit through a
//! [`QRegMap`], which maps the box's registers onto the circuit's.
//!
//! Qubit ordering is fixed throughout the crate: lexicographic by register
//! name, then index, with the first qubit the most significant bit of a
//! basis-state index. Post-selection slicing and operator matrices rely on
//! this ordering.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use ndarray::{Array1, Array2};
use num_complex::Complex64;

use crate::circuits::gate::Gate;
use crate::error::{CircuitError, Result};
use crate::simulator;

/// A single qubit: register name plus index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Qubit {
    name: String,
    index: u32,
}

impl Qubit {
    pub fn new(name: impl Into<String>, index: u32) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }

    pub fn register_name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Display for Qubit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.name, self.index)
    }
}

/// A named, sized qubit register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QubitRegister {
    name: String,
    size: u32,
}

impl QubitRegister {
    pub fn new(name: impl Into<String>, size: u32) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    /// The `i`-th qubit of the register.
    pub fn qubit(&self, index: u32) -> Qubit {
        Qubit::new(self.name.clone(), index)
    }

    /// All qubits of the register, in index order.
    pub fn qubits(&self) -> Vec<Qubit> {
        (0..self.size).map(|i| self.qubit(i)).collect()
    }
}

impl fmt::Display for QubitRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.name, self.size)
    }
}

/// One side of a register-map element: a whole register, a single qubit, or
/// an explicit qubit list.
#[derive(Debug, Clone)]
pub enum MapOperand {
    Register(QubitRegister),
    Qubit(Qubit),
    Qubits(Vec<Qubit>),
}

impl MapOperand {
    fn qubits(&self) -> Vec<Qubit> {
        match self {
            MapOperand::Register(r) => r.qubits(),
            MapOperand::Qubit(q) => vec![q.clone()],
            MapOperand::Qubits(qs) => qs.clone(),
        }
    }

    fn len(&self) -> usize {
        match self {
            MapOperand::Register(r) => r.size() as usize,
            MapOperand::Qubit(_) => 1,
            MapOperand::Qubits(qs) => qs.len(),
        }
    }
}

impl From<QubitRegister> for MapOperand {
    fn from(r: QubitRegister) -> Self {
        MapOperand::Register(r)
    }
}

impl From<&QubitRegister> for MapOperand {
    fn from(r: &QubitRegister) -> Self {
        MapOperand::Register(r.clone())
    }
}

impl From<Qubit> for MapOperand {
    fn from(q: Qubit) -> Self {
        MapOperand::Qubit(q)
    }
}

impl From<Vec<Qubit>> for MapOperand {
    fn from(qs: Vec<Qubit>) -> Self {
        MapOperand::Qubits(qs)
    }
}

/// Qubit register map from a box onto a circuit.
///
/// Each box-side operand maps onto the circuit-side operand at the same
/// position; operands must pair up in size, and no qubit may appear twice on
/// either side.
#[derive(Debug, Clone)]
pub struct QRegMap {
    box_qubits: Vec<Qubit>,
    circ_qubits: Vec<Qubit>,
}

impl QRegMap {
    pub fn new(box_side: Vec<MapOperand>, circ_side: Vec<MapOperand>) -> Result<Self> {
        if box_side.len() != circ_side.len() {
            return Err(CircuitError::RegisterMapSize {
                box_qubits: box_side.len(),
                circ_qubits: circ_side.len(),
            }
            .into());
        }
        for (b, c) in box_side.iter().zip(circ_side.iter()) {
            if b.len() != c.len() {
                return Err(CircuitError::RegisterMapSize {
                    box_qubits: b.len(),
                    circ_qubits: c.len(),
                }
                .into());
            }
        }

        let box_qubits = Self::flatten(&box_side)?;
        let circ_qubits = Self::flatten(&circ_side)?;
        Ok(Self {
            box_qubits,
            circ_qubits,
        })
    }

    /// Convenience constructor from (box, circuit) operand pairs.
    pub fn from_pairs(
        pairs: impl IntoIterator<Item = (MapOperand, MapOperand)>,
    ) -> Result<Self> {
        let (box_side, circ_side) = pairs.into_iter().unzip();
        Self::new(box_side, circ_side)
    }

    fn flatten(side: &[MapOperand]) -> Result<Vec<Qubit>> {
        let mut qubits = Vec::new();
        for operand in side {
            qubits.extend(operand.qubits());
        }
        let mut seen = BTreeSet::new();
        for q in &qubits {
            if !seen.insert(q.clone()) {
                return Err(CircuitError::DuplicateQubit(q.to_string()).into());
            }
        }
        Ok(qubits)
    }

    pub fn box_qubits(&self) -> &[Qubit] {
        &self.box_qubits
    }

    pub fn circ_qubits(&self) -> &[Qubit] {
        &self.circ_qubits
    }

    /// Box qubit → circuit qubit.
    pub fn qubit_map(&self) -> BTreeMap<Qubit, Qubit> {
        self.box_qubits
            .iter()
            .cloned()
            .zip(self.circ_qubits.iter().cloned())
            .collect()
    }
}

impl fmt::Display for QRegMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "QRegMap (box -> circ):")?;
        for (b, c) in self.box_qubits.iter().zip(self.circ_qubits.iter()) {
            writeln!(f, "  {} -> {}", b, c)?;
        }
        Ok(())
    }
}

/// A circuit over named qubit registers.
#[derive(Debug, Clone, Default)]
pub struct RegisterCircuit {
    name: Option<String>,
    registers: Vec<QubitRegister>,
    gates: Vec<Gate>,
}

impl RegisterCircuit {
    /// New empty circuit with a display name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            registers: Vec::new(),
            gates: Vec::new(),
        }
    }

    /// New empty unnamed circuit.
    pub fn unnamed() -> Self {
        Self::default()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Add a fresh register. Fails on a duplicate name.
    pub fn add_register(&mut self, name: &str, size: u32) -> Result<QubitRegister> {
        if self.registers.iter().any(|r| r.name() == name) {
            return Err(CircuitError::DuplicateRegister(name.to_string()).into());
        }
        let reg = QubitRegister::new(name, size);
        self.registers.push(reg.clone());
        Ok(reg)
    }

    /// Adopt an existing register object (same name and size).
    pub fn adopt_register(&mut self, reg: &QubitRegister) -> Result<()> {
        if self.registers.iter().any(|r| r.name() == reg.name()) {
            return Err(CircuitError::DuplicateRegister(reg.name().to_string()).into());
        }
        self.registers.push(reg.clone());
        Ok(())
    }

    pub fn registers(&self) -> &[QubitRegister] {
        &self.registers
    }

    pub fn get_register(&self, name: &str) -> Option<&QubitRegister> {
        self.registers.iter().find(|r| r.name() == name)
    }

    /// All qubits, lexicographic by (register name, index), most significant
    /// first.
    pub fn qubits(&self) -> Vec<Qubit> {
        let mut qs: Vec<Qubit> = self.registers.iter().flat_map(|r| r.qubits()).collect();
        qs.sort();
        qs
    }

    pub fn n_qubits(&self) -> usize {
        self.registers.iter().map(|r| r.size() as usize).sum()
    }

    pub fn contains_qubit(&self, q: &Qubit) -> bool {
        self.get_register(q.register_name())
            .is_some_and(|r| q.index() < r.size())
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    pub fn n_gates(&self) -> usize {
        self.gates.len()
    }

    /// Append a gate, validating its qubits against the circuit.
    pub fn push(&mut self, gate: Gate) -> Result<&mut Self> {
        let mut seen = BTreeSet::new();
        for q in gate.qubits() {
            if !self.contains_qubit(&q) {
                return Err(CircuitError::QubitNotInCircuit(q.to_string()).into());
            }
            if !seen.insert(q.clone()) {
                return Err(CircuitError::DuplicateQubit(q.to_string()).into());
            }
        }
        self.gates.push(gate);
        Ok(self)
    }

    pub fn x(&mut self, q: Qubit) -> Result<&mut Self> {
        self.push(Gate::X(q))
    }

    pub fn y(&mut self, q: Qubit) -> Result<&mut Self> {
        self.push(Gate::Y(q))
    }

    pub fn z(&mut self, q: Qubit) -> Result<&mut Self> {
        self.push(Gate::Z(q))
    }

    pub fn h(&mut self, q: Qubit) -> Result<&mut Self> {
        self.push(Gate::H(q))
    }

    pub fn rx(&mut self, angle: f64, q: Qubit) -> Result<&mut Self> {
        self.push(Gate::Rx { angle, qubit: q })
    }

    pub fn ry(&mut self, angle: f64, q: Qubit) -> Result<&mut Self> {
        self.push(Gate::Ry { angle, qubit: q })
    }

    pub fn rz(&mut self, angle: f64, q: Qubit) -> Result<&mut Self> {
        self.push(Gate::Rz { angle, qubit: q })
    }

    pub fn cx(&mut self, control: Qubit, target: Qubit) -> Result<&mut Self> {
        self.push(Gate::Cx { control, target })
    }

    /// Append all gates of `other`; its qubits must already exist here.
    pub fn append(&mut self, other: &RegisterCircuit) -> Result<&mut Self> {
        for q in other.qubits() {
            if !self.contains_qubit(&q) {
                return Err(CircuitError::QubitNotInCircuit(q.to_string()).into());
            }
        }
        self.gates.extend(other.gates.iter().cloned());
        Ok(self)
    }

    /// Splice a box circuit onto this circuit.
    ///
    /// Without a map, the box qubits must be a subset of the circuit qubits
    /// and are wired identically. With a map, the map's box side must cover a
    /// subset of the box qubits and its circuit side a subset of this
    /// circuit's qubits; every box qubit must be reachable through the map.
    pub fn add_box_circuit(
        &mut self,
        box_circuit: &RegisterCircuit,
        qreg_map: Option<&QRegMap>,
    ) -> Result<&mut Self> {
        match qreg_map {
            None => {
                for q in box_circuit.qubits() {
                    if !self.contains_qubit(&q) {
                        return Err(CircuitError::IncompatibleRegisters(format!(
                            "box qubit {} is not in the circuit",
                            q
                        ))
                        .into());
                    }
                }
                self.gates.extend(box_circuit.gates.iter().cloned());
            }
            Some(map) => {
                for q in map.box_qubits() {
                    if !box_circuit.contains_qubit(q) {
                        return Err(CircuitError::IncompatibleRegisters(format!(
                            "map box qubit {} is not a box qubit",
                            q
                        ))
                        .into());
                    }
                }
                for q in map.circ_qubits() {
                    if !self.contains_qubit(q) {
                        return Err(CircuitError::IncompatibleRegisters(format!(
                            "map circuit qubit {} is not in the circuit",
                            q
                        ))
                        .into());
                    }
                }
                let qubit_map = map.qubit_map();
                for q in box_circuit.qubits() {
                    if !qubit_map.contains_key(&q) {
                        return Err(CircuitError::IncompatibleRegisters(format!(
                            "box qubit {} is not covered by the register map",
                            q
                        ))
                        .into());
                    }
                }
                for gate in &box_circuit.gates {
                    self.gates.push(gate.remapped(&qubit_map));
                }
            }
        }
        Ok(self)
    }

    /// Adjoint circuit: reversed gate order, each gate daggered.
    pub fn dagger(&self) -> RegisterCircuit {
        let mut out = self.clone();
        out.name = self.name.as_ref().map(|n| format!("{}†", n));
        out.gates = self.gates.iter().rev().map(|g| g.dagger()).collect();
        out
    }

    /// Full unitary of the circuit.
    pub fn unitary(&self) -> Result<Array2<Complex64>> {
        simulator::circuit_unitary(self)
    }

    /// State vector from the all-zeros input.
    pub fn statevector(&self) -> Result<Array1<Complex64>> {
        simulator::circuit_statevector(self)
    }
}
