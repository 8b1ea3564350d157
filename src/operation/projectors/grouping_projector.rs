use std::mem::size_of;

use tracing::{debug, trace, warn};

use crate::{
    breaker::RamAccountingContext,
    error::{ExecutionError, Result},
    operation::{
        CollectExpression, InputBinding,
        aggregation::{AggregateState, AggregationContext},
        projectors::{Bucket, Grouper, Projector, ProjectorState, UpstreamHandle},
    },
    types::{DataType, Row, Value},
};

/// Minimum number of table slots claimed when the group table grows.
const MIN_TABLE_GROWTH: usize = 16;

/// Push-based GROUP BY stage.
///
/// Rows are bound to the collect expressions, reduced to a group key and
/// folded into that group's accumulators. Once every upstream has finished,
/// each group is emitted downstream as `[key values..., aggregate results...]`
/// in hash order.
///
/// Every byte retained for groups is claimed through the
/// [`RamAccountingContext`] before or as it is retained; a breaker trip fails
/// the whole stage, nothing is truncated.
///
/// Single owner, single thread: the group table has no synchronization.
/// Parallelism means one instance per shard, each with its own accounting
/// context, all sharing the node's circuit breaker.
pub struct GroupingProjector {
    key_types: Vec<DataType>,
    key_inputs: Vec<InputBinding>,
    collect_expressions: Vec<Box<dyn CollectExpression>>,
    aggregations: Vec<AggregationContext>,
    ram_accounting: RamAccountingContext,

    grouper: Option<Grouper>,
    accounted_slots: usize,
    key_scratch: Vec<Value>,

    downstream: Option<Box<dyn Projector>>,
    handle: UpstreamHandle,
    upstreams: Vec<UpstreamHandle>,
    remaining_upstreams: usize,
    state: ProjectorState,
    rows_seen: u64,
}

impl GroupingProjector {
    pub fn new(
        key_types: Vec<DataType>,
        key_inputs: Vec<InputBinding>,
        collect_expressions: Vec<Box<dyn CollectExpression>>,
        aggregations: Vec<AggregationContext>,
        ram_accounting: RamAccountingContext,
    ) -> Result<Self> {
        if key_types.len() != key_inputs.len() {
            return Err(ExecutionError::InvalidConfig(format!(
                "{} group key types for {} key inputs", key_types.len(), key_inputs.len()
            )));
        }
        let expression_count = collect_expressions.len();
        if let Some(idx) = key_inputs.iter().filter_map(InputBinding::expression_index).find(|i| *i >= expression_count) {
            return Err(ExecutionError::InvalidConfig(format!(
                "group key reads collect expression {idx}, only {expression_count} defined"
            )));
        }
        for agg in &aggregations {
            agg.validate(expression_count)?;
        }

        let handle = UpstreamHandle::new(ram_accounting.context_name());
        Ok(Self {
            key_scratch: vec![Value::Null; key_types.len()],
            key_types,
            key_inputs,
            collect_expressions,
            aggregations,
            ram_accounting,
            grouper: None,
            accounted_slots: 0,
            downstream: None,
            handle,
            upstreams: Vec::new(),
            remaining_upstreams: 0,
            state: ProjectorState::Created,
            rows_seen: 0,
        })
    }

    /// Bytes currently claimed for this stage.
    pub fn accounted_bytes(&self) -> u64 {
        self.ram_accounting.total_bytes()
    }

    pub fn group_count(&self) -> usize {
        self.grouper.as_ref().map_or(0, Grouper::len)
    }

    pub fn rows_seen(&self) -> u64 { self.rows_seen }

    /// Lower bound of what one group costs in accounting: its stored key
    /// slots plus one inline state per aggregate, excluding table overhead.
    pub fn min_bucket_cost(&self) -> u64 {
        let key = if self.key_types.len() == 1 { 0 } else { self.key_types.len() * size_of::<Value>() };
        (key + self.aggregations.len() * size_of::<AggregateState>()) as u64
    }

    /// Handle under which this stage is registered with its downstream.
    pub fn handle(&self) -> &UpstreamHandle { &self.handle }

    fn build_key(&mut self) -> Result<()> {
        for ((slot, binding), ty) in self.key_scratch.iter_mut().zip(&self.key_inputs).zip(&self.key_types) {
            let v = binding.resolve(&self.collect_expressions);
            if v.is_null() || DataType::of(v) == *ty {
                slot.clone_from(v);
            } else {
                *slot = ty.coerce(v.clone())?;
            }
        }
        Ok(())
    }

    fn process_row(&mut self, row: Row<'_>) -> Result<()> {
        for expr in self.collect_expressions.iter_mut() {
            expr.set_next_row(row);
        }
        self.build_key()?;

        let Self { grouper, aggregations, collect_expressions, ram_accounting, key_scratch, accounted_slots, .. } = self;
        let grouper = grouper.as_mut().ok_or(ExecutionError::InvalidProtocolUse {
            operation: "set_next_row",
            state: ProjectorState::Created,
        })?;

        if let Some(bucket) = grouper.bucket_mut(key_scratch) {
            let grown = Self::accumulate(aggregations, bucket, collect_expressions)?;
            return ram_accounting.add_bytes(grown);
        }

        // new group: fold the row into fresh states, claim the memory, and
        // only then make the group visible
        let mut bucket: Bucket = aggregations.iter().map(AggregationContext::new_state).collect();
        Self::accumulate(aggregations, &mut bucket, collect_expressions)?;

        if grouper.is_full() {
            let additional = grouper.len().max(MIN_TABLE_GROWTH);
            ram_accounting.add_bytes((additional * grouper.slot_size()) as u64)?;
            grouper.reserve(additional);
            let reserved = *accounted_slots + additional;
            let actual = grouper.capacity();
            if actual > reserved {
                ram_accounting.add_bytes(((actual - reserved) * grouper.slot_size()) as u64)?;
            }
            *accounted_slots = actual.max(reserved);
        }

        let bucket_bytes = grouper.key_heap_size(key_scratch)
            + bucket.iter().map(AggregateState::estimate_size).sum::<usize>();
        ram_accounting.add_bytes(bucket_bytes as u64)?;

        trace!(key = ?key_scratch, bytes = bucket_bytes, "new group");
        grouper.insert(key_scratch, bucket);
        Ok(())
    }

    /// Fold the bound row into every slot of `bucket`; returns how many heap
    /// bytes variable-size states grew by.
    fn accumulate(
        aggregations: &[AggregationContext],
        bucket: &mut Bucket,
        expressions: &[Box<dyn CollectExpression>],
    ) -> Result<u64> {
        let mut grown = 0u64;
        for (ctx, state) in aggregations.iter().zip(bucket.iter_mut()) {
            if state.is_variable_size() {
                let before = state.heap_size();
                ctx.accumulate(state, expressions)?;
                grown += state.heap_size().saturating_sub(before) as u64;
            } else {
                ctx.accumulate(state, expressions)?;
            }
        }
        Ok(grown)
    }

    fn emit_groups(&mut self) -> Result<()> {
        let grouper = self.grouper.take().unwrap_or_else(|| Grouper::new(self.key_types.len()));
        let downstream = self.downstream.as_mut().ok_or_else(no_downstream)?;

        let groups = grouper.len();
        let mut emitted = 0usize;
        for (mut row, bucket) in grouper.into_buckets() {
            row.reserve(bucket.len());
            for (ctx, state) in self.aggregations.iter().zip(bucket) {
                row.push(ctx.finish(state)?);
            }
            emitted += 1;
            if !downstream.set_next_row(&row)? {
                debug!(emitted, groups, "downstream stopped consuming groups");
                break;
            }
        }
        downstream.upstream_finished()?;

        debug!(
            context = %self.ram_accounting.context_name(),
            rows = self.rows_seen,
            groups,
            emitted,
            bytes = self.ram_accounting.total_bytes(),
            "grouping finished"
        );
        Ok(())
    }

    /// Enter `Failed`: drop every group, hand the claimed bytes back, stop
    /// producers and tell the downstream.
    fn fail(&mut self, cause: ExecutionError) {
        self.state = ProjectorState::Failed;
        self.grouper = None;
        self.ram_accounting.close();
        for upstream in &self.upstreams {
            upstream.cancel();
        }
        if let Some(downstream) = self.downstream.as_mut() {
            if let Err(err) = downstream.upstream_failed(cause) {
                warn!(error = %err, "downstream rejected failure notification");
            }
        }
    }
}

fn no_downstream() -> ExecutionError {
    ExecutionError::InvalidConfig("grouping projector has no downstream".into())
}

impl Projector for GroupingProjector {
    fn state(&self) -> ProjectorState { self.state }

    fn register_upstream(&mut self, upstream: UpstreamHandle) -> Result<()> {
        self.state.require(ProjectorState::Created, "register_upstream")?;
        self.upstreams.push(upstream);
        Ok(())
    }

    fn set_downstream(&mut self, mut downstream: Box<dyn Projector>) -> Result<()> {
        self.state.require(ProjectorState::Created, "set_downstream")?;
        downstream.register_upstream(self.handle.clone())?;
        self.downstream = Some(downstream);
        Ok(())
    }

    fn start_projection(&mut self) -> Result<()> {
        self.state.require(ProjectorState::Created, "start_projection")?;
        let downstream = self.downstream.as_mut().ok_or_else(no_downstream)?;
        if downstream.state() == ProjectorState::Created {
            downstream.start_projection()?;
        }

        for expr in self.collect_expressions.iter_mut() {
            expr.start_collect();
        }
        self.ram_accounting.reset();
        self.grouper = Some(Grouper::new(self.key_types.len()));
        self.accounted_slots = 0;
        self.remaining_upstreams = self.upstreams.len().max(1);
        self.rows_seen = 0;
        self.state = ProjectorState::Started;

        debug!(
            context = %self.ram_accounting.context_name(),
            keys = self.key_types.len(),
            aggregations = self.aggregations.len(),
            upstreams = self.remaining_upstreams,
            "grouping started"
        );
        Ok(())
    }

    fn set_next_row(&mut self, row: Row<'_>) -> Result<bool> {
        match self.state {
            ProjectorState::Started => {}
            ProjectorState::Failed => return Ok(false),
            state => return Err(ExecutionError::InvalidProtocolUse { operation: "set_next_row", state }),
        }
        self.rows_seen += 1;
        match self.process_row(row) {
            Ok(()) => Ok(true),
            Err(err) => {
                self.fail(err.clone());
                Err(err)
            }
        }
    }

    fn upstream_finished(&mut self) -> Result<()> {
        match self.state {
            ProjectorState::Started => {}
            // already failed and reported downstream
            ProjectorState::Failed => return Ok(()),
            state => return Err(ExecutionError::InvalidProtocolUse { operation: "upstream_finished", state }),
        }
        self.remaining_upstreams -= 1;
        if self.remaining_upstreams > 0 {
            return Ok(());
        }

        match self.emit_groups() {
            Ok(()) => {
                self.state = ProjectorState::Finished;
                self.ram_accounting.close();
                Ok(())
            }
            Err(err) => {
                self.fail(err.clone());
                Err(err)
            }
        }
    }

    fn upstream_failed(&mut self, cause: ExecutionError) -> Result<()> {
        match self.state {
            ProjectorState::Created | ProjectorState::Started => {
                debug!(cause = %cause, groups = self.group_count(), "upstream failed, discarding groups");
                self.fail(cause);
                Ok(())
            }
            ProjectorState::Failed => Ok(()),
            state @ ProjectorState::Finished => Err(ExecutionError::InvalidProtocolUse { operation: "upstream_failed", state }),
        }
    }
}
