use core::fmt::Display;

use tilegen_common::{BufferCapacity, ConfigError, ElementType};

/// Every tile dimension step must be a multiple of this hardware alignment unit.
pub const ALIGNMENT_UNIT: u32 = 16;

/// Shape of a matmul tile.
#[derive(new, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileShape {
    pub m: u32,
    pub n: u32,
    pub k: u32,
}

impl TileShape {
    /// The dimensions in `m, n, k` order.
    pub fn dims(&self) -> [u32; 3] {
        [self.m, self.n, self.k]
    }
}

impl Display for TileShape {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}x{}x{}", self.m, self.n, self.k)
    }
}

impl From<(u32, u32, u32)> for TileShape {
    fn from((m, n, k): (u32, u32, u32)) -> Self {
        Self { m, n, k }
    }
}

/// An L1 tile shape with the L0 tile shape it is computed with.
#[derive(new, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileShapeCandidate {
    pub l1: TileShape,
    pub l0: TileShape,
}

impl TileShapeCandidate {
    /// Bytes one stage of each buffer holds for this candidate.
    ///
    /// Saturates at `u64::MAX`, which no buffer capacity accepts.
    pub fn usage(&self, sizes: &ElementSizes) -> BufferUsage {
        let (l1, l0) = (self.l1, self.l0);
        let bytes = |x: u32, y: u32, size: u32| {
            (x as u64)
                .saturating_mul(y as u64)
                .saturating_mul(size as u64)
        };

        BufferUsage {
            l1a: bytes(l1.m, l1.k, sizes.a),
            l1b: bytes(l1.n, l1.k, sizes.b),
            l0a: bytes(l0.m, l0.k, sizes.a),
            l0b: bytes(l0.k, l0.n, sizes.b),
            l0c: bytes(l0.m, l0.n, sizes.accumulator),
        }
    }

    /// The L0 tile covers the full M and N extent of the L1 tile.
    pub fn is_unsplit(&self) -> bool {
        self.l1.m == self.l0.m && self.l1.n == self.l0.n
    }
}

/// Bytes held by a single stage of every on-chip buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferUsage {
    pub l1a: u64,
    pub l1b: u64,
    pub l0a: u64,
    pub l0b: u64,
    pub l0c: u64,
}

/// Inclusive range of one tile dimension.
#[derive(new, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AxisRange {
    pub min: u32,
    pub max: u32,
}

impl AxisRange {
    /// Range holding a single value.
    pub fn fixed(value: u32) -> Self {
        Self::new(value, value)
    }

    /// Number of values visited with `step`, `max` included when it is on the grid.
    pub fn len(&self, step: u32) -> u32 {
        (self.max - self.min) / step + 1
    }

    fn value(&self, index: u32, step: u32) -> u32 {
        self.min + index * step
    }

    fn validate(&self, axis: &'static str) -> Result<(), ConfigError> {
        if self.min == 0 || self.min > self.max {
            return Err(ConfigError::InvalidRange {
                axis,
                min: self.min,
                max: self.max,
            });
        }

        Ok(())
    }
}

impl From<(u32, u32)> for AxisRange {
    fn from((min, max): (u32, u32)) -> Self {
        Self { min, max }
    }
}

/// Ranges of the six tile dimensions explored by a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileShapeRange {
    pub l1_m: AxisRange,
    pub l1_n: AxisRange,
    pub l1_k: AxisRange,
    pub l0_m: AxisRange,
    pub l0_n: AxisRange,
    pub l0_k: AxisRange,
}

impl TileShapeRange {
    /// Ranges where L0 follows L1 on M and N and takes a quarter of its K extent.
    pub fn with_default_l0(l1_m: AxisRange, l1_n: AxisRange, l1_k: AxisRange) -> Self {
        Self {
            l1_m,
            l1_n,
            l1_k,
            l0_m: l1_m,
            l0_n: l1_n,
            l0_k: AxisRange::new(l1_k.min / 4, l1_k.max / 4),
        }
    }

    fn axes(&self) -> [(&'static str, AxisRange); 6] {
        [
            ("l1_m", self.l1_m),
            ("l1_n", self.l1_n),
            ("l1_k", self.l1_k),
            ("l0_m", self.l0_m),
            ("l0_n", self.l0_n),
            ("l0_k", self.l0_k),
        ]
    }
}

/// Byte sizes of the A, B and accumulator elements.
#[derive(new, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementSizes {
    pub a: u32,
    pub b: u32,
    pub accumulator: u32,
}

impl ElementSizes {
    /// Sizes of the given element types.
    pub fn from_types(a: ElementType, b: ElementType, accumulator: ElementType) -> Self {
        Self::new(
            a.size_in_bytes(),
            b.size_in_bytes(),
            accumulator.size_in_bytes(),
        )
    }
}

impl Default for ElementSizes {
    fn default() -> Self {
        Self::new(2, 2, 4)
    }
}

/// Decides whether a tile-shape candidate fits the on-chip buffers.
pub trait TileShapeConstraint {
    fn accepts(&self, candidate: &TileShapeCandidate, sizes: &ElementSizes) -> bool;
}

impl<C: TileShapeConstraint + ?Sized> TileShapeConstraint for &C {
    fn accepts(&self, candidate: &TileShapeCandidate, sizes: &ElementSizes) -> bool {
        (**self).accepts(candidate, sizes)
    }
}

impl<C: TileShapeConstraint + ?Sized> TileShapeConstraint for Box<C> {
    fn accepts(&self, candidate: &TileShapeCandidate, sizes: &ElementSizes) -> bool {
        (**self).accepts(candidate, sizes)
    }
}

/// Double buffered L1, L0A and L0B with a single buffered accumulator.
#[derive(new, Debug, Clone, Copy)]
pub struct PingpongConstraint {
    pub stages: u32,
    pub capacity: BufferCapacity,
}

impl TileShapeConstraint for PingpongConstraint {
    fn accepts(&self, candidate: &TileShapeCandidate, sizes: &ElementSizes) -> bool {
        let usage = candidate.usage(sizes);
        let stages = self.stages as u64;

        usage.l1a.saturating_add(usage.l1b).saturating_mul(stages) <= self.capacity.l1
            && usage.l0a.saturating_mul(stages) <= self.capacity.l0a
            && usage.l0b.saturating_mul(stages) <= self.capacity.l0b
            && usage.l0c <= self.capacity.l0c
    }
}

/// Stage count of every buffer of the preload-async pipeline.
#[derive(new, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PreloadAsyncStages {
    pub preload: u32,
    pub l1: u32,
    pub l0a: u32,
    pub l0b: u32,
    pub l0c: u32,
}

impl Default for PreloadAsyncStages {
    fn default() -> Self {
        Self::new(1, 2, 4, 2, 1)
    }
}

/// Preload-async pipeline: every buffer level is scaled by its own stage count.
#[derive(new, Debug, Clone, Copy)]
pub struct PreloadAsyncConstraint {
    pub stages: PreloadAsyncStages,
    pub capacity: BufferCapacity,
}

impl TileShapeConstraint for PreloadAsyncConstraint {
    fn accepts(&self, candidate: &TileShapeCandidate, sizes: &ElementSizes) -> bool {
        let usage = candidate.usage(sizes);
        let stages = self.stages;

        usage.l1a.saturating_add(usage.l1b).saturating_mul(stages.l1 as u64) <= self.capacity.l1
            && usage.l0a.saturating_mul(stages.l0a as u64) <= self.capacity.l0a
            && usage.l0b.saturating_mul(stages.l0b as u64) <= self.capacity.l0b
            && usage.l0c.saturating_mul(stages.l0c as u64) <= self.capacity.l0c
    }
}

/// Accepts every candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconstrained;

impl TileShapeConstraint for Unconstrained {
    fn accepts(&self, _candidate: &TileShapeCandidate, _sizes: &ElementSizes) -> bool {
        true
    }
}

/// Named pruning predicate of a declarative search space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileShapePruning {
    /// See [PingpongConstraint].
    Pingpong { stages: u32 },
    /// See [PreloadAsyncConstraint].
    PreloadAsync(PreloadAsyncStages),
    /// See [Unconstrained].
    Unconstrained,
}

impl Default for TileShapePruning {
    fn default() -> Self {
        Self::Pingpong { stages: 2 }
    }
}

impl TileShapePruning {
    /// The budget check for the given buffer capacities.
    pub fn constraint(&self, capacity: BufferCapacity) -> Box<dyn TileShapeConstraint> {
        match self {
            TileShapePruning::Pingpong { stages } => {
                Box::new(PingpongConstraint::new(*stages, capacity))
            }
            TileShapePruning::PreloadAsync(stages) => {
                Box::new(PreloadAsyncConstraint::new(*stages, capacity))
            }
            TileShapePruning::Unconstrained => Box::new(Unconstrained),
        }
    }
}

/// The tile shapes of a range, pruned by a budget constraint.
///
/// Validation happens on construction; iteration is lazy and can be restarted with
/// [iter](TileShapeSearch::iter).
#[derive(Debug, Clone)]
pub struct TileShapeSearch<C: TileShapeConstraint> {
    range: TileShapeRange,
    step: u32,
    sizes: ElementSizes,
    constraint: C,
}

impl<C: TileShapeConstraint> TileShapeSearch<C> {
    pub fn new(
        range: TileShapeRange,
        step: u32,
        sizes: ElementSizes,
        constraint: C,
    ) -> Result<Self, ConfigError> {
        if step == 0 || step % ALIGNMENT_UNIT != 0 {
            return Err(ConfigError::StepNotAligned {
                step,
                alignment: ALIGNMENT_UNIT,
            });
        }

        for (axis, axis_range) in range.axes() {
            axis_range.validate(axis)?;
        }

        Ok(Self {
            range,
            step,
            sizes,
            constraint,
        })
    }

    /// Iterates the accepted candidates.
    ///
    /// Axes are visited in `l1.m, l1.n, l1.k, l0.m, l0.n, l0.k` order, the last one varying
    /// fastest. Candidates splitting M or N between L1 and L0 are never produced.
    pub fn iter(&self) -> TileShapeIter<'_, C> {
        let axes = self.range.axes().map(|(_, range)| range);

        TileShapeIter {
            search: self,
            lengths: axes.map(|range| range.len(self.step)),
            axes,
            cursor: [0; 6],
            done: false,
            accepted: 0,
            rejected: 0,
        }
    }

    /// Total size of the unpruned cross product.
    pub fn cross_product_len(&self) -> u64 {
        self.range
            .axes()
            .iter()
            .map(|(_, range)| range.len(self.step) as u64)
            .product()
    }

    pub fn sizes(&self) -> ElementSizes {
        self.sizes
    }

    pub fn step(&self) -> u32 {
        self.step
    }
}

/// Odometer over the axes of a [TileShapeSearch].
pub struct TileShapeIter<'a, C: TileShapeConstraint> {
    search: &'a TileShapeSearch<C>,
    axes: [AxisRange; 6],
    lengths: [u32; 6],
    cursor: [u32; 6],
    done: bool,
    accepted: usize,
    rejected: usize,
}

impl<C: TileShapeConstraint> TileShapeIter<'_, C> {
    fn current(&self) -> TileShapeCandidate {
        let step = self.search.step;
        let v: [u32; 6] = core::array::from_fn(|i| self.axes[i].value(self.cursor[i], step));

        TileShapeCandidate::new(
            TileShape::new(v[0], v[1], v[2]),
            TileShape::new(v[3], v[4], v[5]),
        )
    }

    /// Candidates produced so far.
    pub fn accepted(&self) -> usize {
        self.accepted
    }

    /// Candidates dropped so far, either split or over budget.
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    fn advance(&mut self) {
        for axis in (0..6).rev() {
            self.cursor[axis] += 1;
            if self.cursor[axis] < self.lengths[axis] {
                return;
            }
            self.cursor[axis] = 0;
        }

        self.done = true;
    }

    fn keep(&mut self, candidate: &TileShapeCandidate) -> bool {
        let search = self.search;

        if !candidate.is_unsplit() {
            self.rejected += 1;
            return false;
        }
        if !search.constraint.accepts(candidate, &search.sizes) {
            log::debug!(
                "Tile shape {} / {} exceeds the buffer budget",
                candidate.l1,
                candidate.l0
            );
            self.rejected += 1;
            return false;
        }

        self.accepted += 1;
        true
    }
}

impl<C: TileShapeConstraint> Iterator for TileShapeIter<'_, C> {
    type Item = TileShapeCandidate;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let candidate = self.current();
            self.advance();
            let keep = self.keep(&candidate);

            if self.done {
                log::info!(
                    "Tile shape search done: {} accepted, {} rejected",
                    self.accepted,
                    self.rejected
                );
            }
            if keep {
                return Some(candidate);
            }
        }

        None
    }
}
