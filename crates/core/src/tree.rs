//! On-the-fly decision-tree induction and prediction.
//!
//! A tree is built fresh from a set of attribute records each time a
//! prediction is requested, used for that prediction, and discarded.
//! Categorical targets are split by information gain (Shannon entropy),
//! numeric targets by variance reduction. Numeric splitting attributes get
//! binary threshold splits; categorical splitting attributes get one branch
//! per observed value.

use crate::error::{Error, Result};
use crate::record::{AttrValue, Attribute, AttributeRecord};

/// Later candidates must beat the incumbent by more than this to displace
/// it, so equal-quality splits resolve to the first attribute considered.
const GAIN_EPSILON: f64 = 1e-12;

/// Induction limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeConfig {
    /// Maximum tree depth.
    pub max_depth: usize,

    /// Minimum records required at a node to attempt a split.
    pub min_records_split: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            min_records_split: 2,
        }
    }
}

impl TreeConfig {
    /// Set the maximum tree depth.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the minimum records required to attempt a split.
    pub fn with_min_records_split(mut self, min: usize) -> Self {
        self.min_records_split = min.max(1);
        self
    }
}

/// A tree node.
#[derive(Debug, Clone, PartialEq)]
enum Node {
    /// Terminal node holding the predicted value.
    Leaf { value: AttrValue, records: usize },

    /// Binary split on a numeric attribute: `value > threshold` goes above.
    NumericSplit {
        attribute: Attribute,
        threshold: f64,
        below: Box<Node>,
        above: Box<Node>,
        /// Branch taken when the query lacks the attribute: true when the
        /// above branch received more training records.
        default_above: bool,
    },

    /// N-ary split on a categorical attribute, one branch per value
    /// observed at this node, in first-observed order.
    CategoricalSplit {
        attribute: Attribute,
        branches: Vec<(AttrValue, Node)>,
        /// Index of the branch that received the most training records;
        /// taken when the query's value matches no branch.
        default_branch: usize,
    },
}

impl Node {
    fn count_nodes(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::NumericSplit { below, above, .. } => {
                1 + below.count_nodes() + above.count_nodes()
            }
            Node::CategoricalSplit { branches, .. } => {
                1 + branches.iter().map(|(_, n)| n.count_nodes()).sum::<usize>()
            }
        }
    }

    fn count_leaves(&self) -> usize {
        match self {
            Node::Leaf { .. } => 1,
            Node::NumericSplit { below, above, .. } => {
                below.count_leaves() + above.count_leaves()
            }
            Node::CategoricalSplit { branches, .. } => {
                branches.iter().map(|(_, n)| n.count_leaves()).sum()
            }
        }
    }

    fn max_depth(&self) -> usize {
        match self {
            Node::Leaf { .. } => 0,
            Node::NumericSplit { below, above, .. } => {
                1 + below.max_depth().max(above.max_depth())
            }
            Node::CategoricalSplit { branches, .. } => {
                1 + branches.iter().map(|(_, n)| n.max_depth()).max().unwrap_or(0)
            }
        }
    }

    fn count_records(&self) -> usize {
        match self {
            Node::Leaf { records, .. } => *records,
            Node::NumericSplit { below, above, .. } => {
                below.count_records() + above.count_records()
            }
            Node::CategoricalSplit { branches, .. } => {
                branches.iter().map(|(_, n)| n.count_records()).sum()
            }
        }
    }
}

/// Tree structure information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeInfo {
    /// Total number of nodes.
    pub num_nodes: usize,
    /// Number of leaf nodes.
    pub num_leaves: usize,
    /// Maximum depth (0 for a single leaf).
    pub max_depth: usize,
    /// Training records that reached the leaves.
    pub num_records: usize,
}

/// A transient decision tree mapping attribute records to one target
/// attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    root: Node,
    category: Attribute,
}

impl DecisionTree {
    /// Build a tree predicting `category` from `records`, never splitting
    /// on `ignored` attributes.
    ///
    /// An empty training set yields a degenerate single-leaf tree whose
    /// prediction is the unset sentinel. A non-empty set in which no record
    /// carries a value for `category` is trainer misuse and fails fast.
    pub fn train(
        records: &[AttributeRecord],
        category: Attribute,
        ignored: &[Attribute],
        config: &TreeConfig,
    ) -> Result<DecisionTree> {
        if records.is_empty() {
            return Ok(DecisionTree {
                root: Node::Leaf {
                    value: AttrValue::Unset,
                    records: 0,
                },
                category,
            });
        }

        let labelled: Vec<&AttributeRecord> = records
            .iter()
            .filter(|r| !r.get(category).is_unset())
            .collect();
        if labelled.is_empty() {
            return Err(Error::UnlabelledTarget(category.name()));
        }

        let candidates: Vec<Attribute> = Attribute::ALL
            .iter()
            .copied()
            .filter(|a| *a != category && !ignored.contains(a))
            .collect();

        let root = build(&labelled, category, &candidates, config, 0);
        let tree = DecisionTree { root, category };
        let info = tree.info();
        log::debug!(
            "trained '{}' tree over {} records: {} nodes, {} leaves, depth {}",
            category,
            labelled.len(),
            info.num_nodes,
            info.num_leaves,
            info.max_depth
        );
        Ok(tree)
    }

    /// The attribute this tree predicts.
    pub fn category(&self) -> Attribute {
        self.category
    }

    /// Walk the tree for `query` and return the leaf's value.
    ///
    /// At a split whose attribute the query lacks (or holds an unset value
    /// for), the walk takes the default branch. Never fails; a degenerate
    /// tree answers with the unset sentinel.
    pub fn predict(&self, query: &AttributeRecord) -> AttrValue {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { value, .. } => return value.clone(),
                Node::NumericSplit {
                    attribute,
                    threshold,
                    below,
                    above,
                    default_above,
                } => {
                    node = match query.get(*attribute) {
                        AttrValue::Number(v) => {
                            if v > *threshold {
                                above
                            } else {
                                below
                            }
                        }
                        _ => {
                            if *default_above {
                                above
                            } else {
                                below
                            }
                        }
                    };
                }
                Node::CategoricalSplit {
                    attribute,
                    branches,
                    default_branch,
                } => {
                    let value = query.get(*attribute);
                    let matched = if value.is_unset() {
                        None
                    } else {
                        branches.iter().find(|(v, _)| *v == value)
                    };
                    node = match matched {
                        Some((_, child)) => child,
                        None => &branches[*default_branch].1,
                    };
                }
            }
        }
    }

    /// Structure information (node, leaf, and depth counts).
    pub fn info(&self) -> TreeInfo {
        TreeInfo {
            num_nodes: self.root.count_nodes(),
            num_leaves: self.root.count_leaves(),
            max_depth: self.root.max_depth(),
            num_records: self.root.count_records(),
        }
    }
}

/// The split a node settles on, with the partitions it induces.
enum SplitPlan<'a> {
    Numeric {
        attribute: Attribute,
        threshold: f64,
        below: Vec<&'a AttributeRecord>,
        above: Vec<&'a AttributeRecord>,
    },
    Categorical {
        attribute: Attribute,
        groups: Vec<(AttrValue, Vec<&'a AttributeRecord>)>,
    },
}

fn build(
    records: &[&AttributeRecord],
    category: Attribute,
    candidates: &[Attribute],
    config: &TreeConfig,
    depth: usize,
) -> Node {
    if depth >= config.max_depth
        || records.len() < config.min_records_split
        || is_pure(records, category)
    {
        return make_leaf(records, category);
    }

    match best_split(records, category, candidates) {
        Some(SplitPlan::Numeric {
            attribute,
            threshold,
            below,
            above,
        }) => {
            let default_above = above.len() > below.len();
            Node::NumericSplit {
                attribute,
                threshold,
                below: Box::new(build(&below, category, candidates, config, depth + 1)),
                above: Box::new(build(&above, category, candidates, config, depth + 1)),
                default_above,
            }
        }
        Some(SplitPlan::Categorical { attribute, groups }) => {
            let default_branch = largest_group(&groups);
            let branches = groups
                .into_iter()
                .map(|(value, group)| {
                    (value, build(&group, category, candidates, config, depth + 1))
                })
                .collect();
            Node::CategoricalSplit {
                attribute,
                branches,
                default_branch,
            }
        }
        None => make_leaf(records, category),
    }
}

/// Pick the attribute and partition with the highest gain; `None` when no
/// candidate separates the records. Candidates are tried in declaration
/// order and ties keep the earliest.
fn best_split<'a>(
    records: &[&'a AttributeRecord],
    category: Attribute,
    candidates: &[Attribute],
) -> Option<SplitPlan<'a>> {
    let parent_impurity = impurity(records, category);
    let n = records.len() as f64;
    let mut best_gain = 0.0;
    let mut best: Option<SplitPlan> = None;

    for &attr in candidates {
        if attr.is_numeric() {
            for threshold in numeric_thresholds(records, attr) {
                let (below, above) = partition_numeric(records, attr, threshold);
                if below.is_empty() || above.is_empty() {
                    continue;
                }
                let weighted = (below.len() as f64 / n) * impurity(&below, category)
                    + (above.len() as f64 / n) * impurity(&above, category);
                let gain = parent_impurity - weighted;
                if gain > best_gain + GAIN_EPSILON {
                    best_gain = gain;
                    best = Some(SplitPlan::Numeric {
                        attribute: attr,
                        threshold,
                        below,
                        above,
                    });
                }
            }
        } else {
            let groups = group_by_value(records, attr);
            if groups.len() < 2 {
                continue;
            }
            let weighted: f64 = groups
                .iter()
                .map(|(_, g)| (g.len() as f64 / n) * impurity(g, category))
                .sum();
            let gain = parent_impurity - weighted;
            if gain > best_gain + GAIN_EPSILON {
                best_gain = gain;
                best = Some(SplitPlan::Categorical {
                    attribute: attr,
                    groups,
                });
            }
        }
    }

    best
}

/// Candidate thresholds: midpoints between consecutive distinct values.
fn numeric_thresholds(records: &[&AttributeRecord], attr: Attribute) -> Vec<f64> {
    let mut values: Vec<f64> = records
        .iter()
        .filter_map(|r| r.get(attr).as_number())
        .collect();
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    values.dedup();
    values
        .windows(2)
        .map(|pair| (pair[0] + pair[1]) / 2.0)
        .collect()
}

/// Partition by `value > threshold`; records without a value for the
/// attribute fail the test and land below.
fn partition_numeric<'a>(
    records: &[&'a AttributeRecord],
    attr: Attribute,
    threshold: f64,
) -> (Vec<&'a AttributeRecord>, Vec<&'a AttributeRecord>) {
    let mut below = Vec::new();
    let mut above = Vec::new();
    for &record in records {
        match record.get(attr).as_number() {
            Some(v) if v > threshold => above.push(record),
            _ => below.push(record),
        }
    }
    (below, above)
}

/// Group by exact value in first-observed order. Unset is a group of its
/// own, not a merge into any other.
fn group_by_value<'a>(
    records: &[&'a AttributeRecord],
    attr: Attribute,
) -> Vec<(AttrValue, Vec<&'a AttributeRecord>)> {
    let mut groups: Vec<(AttrValue, Vec<&AttributeRecord>)> = Vec::new();
    for &record in records {
        let value = record.get(attr);
        match groups.iter_mut().find(|(v, _)| *v == value) {
            Some((_, group)) => group.push(record),
            None => groups.push((value, vec![record])),
        }
    }
    groups
}

fn largest_group(groups: &[(AttrValue, Vec<&AttributeRecord>)]) -> usize {
    let mut best = 0;
    for (i, (_, group)) in groups.iter().enumerate() {
        if group.len() > groups[best].1.len() {
            best = i;
        }
    }
    best
}

fn is_pure(records: &[&AttributeRecord], category: Attribute) -> bool {
    let mut values = records.iter().map(|r| r.get(category));
    match values.next() {
        Some(first) => values.all(|v| v == first),
        None => true,
    }
}

/// Impurity of a record set with respect to the target: Shannon entropy
/// for categorical targets, variance for numeric ones.
fn impurity(records: &[&AttributeRecord], category: Attribute) -> f64 {
    if category.is_numeric() {
        let values: Vec<f64> = records
            .iter()
            .filter_map(|r| r.get(category).as_number())
            .collect();
        if values.len() < 2 {
            return 0.0;
        }
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
    } else {
        let counts = value_counts(records, category);
        let n = records.len() as f64;
        -counts
            .iter()
            .map(|(_, c)| {
                let p = *c as f64 / n;
                p * p.ln()
            })
            .sum::<f64>()
    }
}

/// Per-value counts in first-observed order.
fn value_counts(records: &[&AttributeRecord], category: Attribute) -> Vec<(AttrValue, usize)> {
    let mut counts: Vec<(AttrValue, usize)> = Vec::new();
    for record in records {
        let value = record.get(category);
        match counts.iter_mut().find(|(v, _)| *v == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }
    counts
}

/// The representative value of the records: majority for categorical
/// targets (ties keep the first-observed value), mean for numeric ones.
fn make_leaf(records: &[&AttributeRecord], category: Attribute) -> Node {
    let value = if category.is_numeric() {
        let values: Vec<f64> = records
            .iter()
            .filter_map(|r| r.get(category).as_number())
            .collect();
        if values.is_empty() {
            AttrValue::Unset
        } else {
            AttrValue::Number(values.iter().sum::<f64>() / values.len() as f64)
        }
    } else {
        let mut majority = AttrValue::Unset;
        let mut majority_count = 0;
        for (value, count) in value_counts(records, category) {
            if count > majority_count {
                majority = value;
                majority_count = count;
            }
        }
        majority
    };
    Node::Leaf {
        value,
        records: records.len(),
    }
}
