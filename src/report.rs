use pilex::{AnalysisInput, ResultRecord};
use std::fmt::Write;

/// Largest number of node rows printed in the response table.
const TABLE_ROWS: usize = 11;

/// Render a textual summary of a pile analysis.
///
/// The header restates the inputs so the numbers can be checked by hand, for
/// example against the cantilever deflection `HL³/3EI` when there is no soil.
#[must_use]
pub fn render_summary(input: &AnalysisInput, record: &ResultRecord) -> String {
    let mut output = String::new();

    writeln!(
        &mut output,
        "Lateral pile analysis (L = {:.3}, EI = {:.4e}, {} nodes, {} / {})",
        input.pile.length,
        input.pile.flexural_rigidity,
        input.config.node_count,
        input.config.boundary_condition,
        input.config.tip_condition
    )
    .expect("writing to string cannot fail");

    writeln!(
        &mut output,
        "Head loads: H = {:+.3}, M = {:+.3}, P = {:+.3}",
        input.load.lateral_load, input.load.moment, input.load.axial_load
    )
    .expect("writing to string cannot fail");

    match input.soil.layers.len() {
        0 => output.push_str("Soil: none\n"),
        count => writeln!(&mut output, "Soil: {count} layer(s) to depth {:.3}", input.pile.length)
            .expect("writing to string cannot fail"),
    }

    if !record.success {
        let reason = record.error.as_deref().unwrap_or("unknown error");
        writeln!(&mut output, "Analysis failed: {reason}").expect("writing to string cannot fail");
        return output;
    }

    if record.converged {
        writeln!(
            &mut output,
            "Soil iteration converged after {} iteration(s)",
            record.iterations
        )
        .expect("writing to string cannot fail");
    } else {
        writeln!(
            &mut output,
            "Warning: soil iteration stopped after {} iteration(s) without meeting the tolerance",
            record.iterations
        )
        .expect("writing to string cannot fail");
    }

    writeln!(
        &mut output,
        "Head deflection: {:+.4e}",
        record.deflection_at_load
    )
    .expect("writing to string cannot fail");

    let moment_depth = record
        .max_moment_node()
        .map_or(0.0, |node| record.depths[node]);
    writeln!(
        &mut output,
        "Maxima: |y| = {:.4e}, |M| = {:.4e} at depth {:.3}, |V| = {:.4e}",
        record.max_deflection, record.max_moment, moment_depth, record.max_shear
    )
    .expect("writing to string cannot fail");

    writeln!(
        &mut output,
        "{:>10} {:>12} {:>12} {:>12} {:>12}",
        "depth", "deflection", "moment", "shear", "soil"
    )
    .expect("writing to string cannot fail");
    for node in table_nodes(record.node_count()) {
        writeln!(
            &mut output,
            "{:>10.3} {:>12.4e} {:>12.4e} {:>12.4e} {:>12.4e}",
            record.depths[node],
            record.deflections[node],
            record.moments[node],
            record.shears[node],
            record.soil_reactions[node]
        )
        .expect("writing to string cannot fail");
    }

    output
}

/// Evenly spaced node indices including the head and the tip.
fn table_nodes(node_count: usize) -> Vec<usize> {
    if node_count <= TABLE_ROWS {
        return (0..node_count).collect();
    }
    let intervals = TABLE_ROWS - 1;
    (0..=intervals)
        .map(|row| row * (node_count - 1) / intervals)
        .collect()
}
