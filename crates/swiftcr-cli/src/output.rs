//! CSV rendering of edges and clusters

use std::borrow::Cow;
use std::io::Write;

use swiftcr_lib::{Clustering, LinkResult};

/// Header row of the edge table
pub const EDGE_HEADER: &str = "seq1,seq2,edit_type,edit_position,cluster_id";

/// Header row of the cluster table
pub const CLUSTER_HEADER: &str = "cluster_id,size,sequence";

/// Quote a field if it holds a delimiter, quote or line break
fn csv_field(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// Write one row per edge, tagged with the cluster holding it
pub fn write_edges<W: Write>(
    out: &mut W,
    result: &LinkResult,
    clustering: &Clustering,
) -> std::io::Result<()> {
    writeln!(out, "{EDGE_HEADER}")?;
    for (edge, view) in result.edges().iter().zip(result.edge_views()) {
        let cluster = clustering
            .cluster_of(edge.left)
            .map(|id| id.to_string())
            .unwrap_or_default();
        writeln!(
            out,
            "{},{},{},{},{}",
            csv_field(view.left),
            csv_field(view.right),
            view.kind,
            edge.position_label(),
            cluster
        )?;
    }
    Ok(())
}

/// Write one row per cluster member
pub fn write_clusters<W: Write>(
    out: &mut W,
    result: &LinkResult,
    clustering: &Clustering,
) -> std::io::Result<()> {
    writeln!(out, "{CLUSTER_HEADER}")?;
    for cluster in clustering.iter() {
        for seq in cluster.sequences(result.sequences()) {
            writeln!(out, "{},{},{}", cluster.id, cluster.len(), csv_field(seq))?;
        }
    }
    Ok(())
}
