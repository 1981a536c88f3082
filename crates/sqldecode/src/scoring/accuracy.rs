//! # Accuracy Aggregation

use std::fmt;

use crate::scoring::{BatchMatches, ExampleMatch};

/// Correct-example counts per field, accumulated across batches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AccuracyCounts {
    /// Examples scored.
    pub total: usize,

    /// Select columns.
    pub sel: usize,

    /// Condition connector.
    pub conn: usize,

    /// Aggregations.
    pub agg: usize,

    /// Condition count.
    pub wn: usize,

    /// Condition columns.
    pub wc: usize,

    /// Condition operators.
    pub wo: usize,

    /// Condition values.
    pub wv: usize,

    /// Logical form.
    pub lx: usize,

    /// Execution.
    pub x: usize,

    /// Examples with an execution result.
    pub x_total: usize,
}

impl AccuracyCounts {
    /// Count one example.
    pub fn add(
        &mut self,
        m: &ExampleMatch,
    ) {
        self.total += 1;
        self.sel += m.sel as usize;
        self.conn += m.conn as usize;
        self.agg += m.agg as usize;
        self.wn += m.wn as usize;
        self.wc += m.wc as usize;
        self.wo += m.wo as usize;
        self.wv += m.wv as usize;
        self.lx += m.lx as usize;
        if let Some(x) = m.x {
            self.x_total += 1;
            self.x += x as usize;
        }
    }

    /// Count a batch of per-field vectors.
    pub fn add_batch(
        &mut self,
        batch: &BatchMatches,
    ) {
        let sum = |xs: &[u8]| xs.iter().map(|&x| x as usize).sum::<usize>();
        self.total += batch.lx.len();
        self.sel += sum(&batch.sel);
        self.conn += sum(&batch.conn);
        self.agg += sum(&batch.agg);
        self.wn += sum(&batch.wn);
        self.wc += sum(&batch.wc);
        self.wo += sum(&batch.wo);
        self.wv += sum(&batch.wv);
        self.lx += sum(&batch.lx);
    }

    /// Fold another set of counts into this one.
    pub fn merge(
        &mut self,
        other: &AccuracyCounts,
    ) {
        self.total += other.total;
        self.sel += other.sel;
        self.conn += other.conn;
        self.agg += other.agg;
        self.wn += other.wn;
        self.wc += other.wc;
        self.wo += other.wo;
        self.wv += other.wv;
        self.lx += other.lx;
        self.x += other.x;
        self.x_total += other.x_total;
    }

    /// The per-field accuracies.
    pub fn report(&self) -> AccuracyReport {
        let ratio = |n: usize, d: usize| if d == 0 { 0.0 } else { n as f64 / d as f64 };
        let t = self.total;
        AccuracyReport {
            total: t,
            sel: ratio(self.sel, t),
            conn: ratio(self.conn, t),
            agg: ratio(self.agg, t),
            wn: ratio(self.wn, t),
            wc: ratio(self.wc, t),
            wo: ratio(self.wo, t),
            wv: ratio(self.wv, t),
            lx: ratio(self.lx, t),
            x: (self.x_total > 0).then(|| ratio(self.x, self.x_total)),
        }
    }
}

impl Extend<ExampleMatch> for AccuracyCounts {
    fn extend<I: IntoIterator<Item = ExampleMatch>>(
        &mut self,
        iter: I,
    ) {
        for m in iter {
            self.add(&m);
        }
    }
}

/// Per-field accuracies in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AccuracyReport {
    /// Examples scored.
    pub total: usize,

    /// Select columns.
    pub sel: f64,

    /// Condition connector.
    pub conn: f64,

    /// Aggregations.
    pub agg: f64,

    /// Condition count.
    pub wn: f64,

    /// Condition columns.
    pub wc: f64,

    /// Condition operators.
    pub wo: f64,

    /// Condition values.
    pub wv: f64,

    /// Logical form.
    pub lx: f64,

    /// Execution, when scored.
    pub x: Option<f64>,
}

impl fmt::Display for AccuracyReport {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(
            f,
            "n={} sel={:.3} conn={:.3} agg={:.3} wn={:.3} wc={:.3} wo={:.3} wv={:.3} lx={:.3}",
            self.total,
            self.sel,
            self.conn,
            self.agg,
            self.wn,
            self.wc,
            self.wo,
            self.wv,
            self.lx
        )?;
        if let Some(x) = self.x {
            write!(f, " x={x:.3}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all(v: u8) -> ExampleMatch {
        ExampleMatch {
            sel: v,
            conn: v,
            agg: v,
            wn: v,
            wc: v,
            wo: v,
            wv: v,
            lx: v,
            x: None,
        }
    }

    #[test]
    fn test_counts_and_report() {
        let mut counts = AccuracyCounts::default();
        counts.extend([all(1), all(0), all(1).with_execution(1), all(1)]);
        assert_eq!(counts.total, 4);
        assert_eq!(counts.lx, 3);
        assert_eq!(counts.x_total, 1);

        let report = counts.report();
        assert_eq!(report.lx, 0.75);
        assert_eq!(report.x, Some(1.0));
        assert!(report.to_string().starts_with("n=4 sel=0.750"));
        assert!(report.to_string().ends_with("x=1.000"));
    }

    #[test]
    fn test_merge_and_batches() {
        let batch: BatchMatches = [all(1), all(0)].into_iter().collect();
        let mut a = AccuracyCounts::default();
        a.add_batch(&batch);

        let mut b = AccuracyCounts::default();
        b.add(&all(1));
        a.merge(&b);
        assert_eq!(a.total, 3);
        assert_eq!(a.wv, 2);
        assert_eq!(a.report().x, None);
    }

    #[test]
    fn test_empty_report() {
        let report = AccuracyCounts::default().report();
        assert_eq!(report.lx, 0.0);
        assert_eq!(report.total, 0);
    }
}
