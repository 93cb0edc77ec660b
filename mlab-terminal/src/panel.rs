/// Text overlay with the current matrices, bases and a pipeline trace
use mlab_core::{Frame, Lab};
use nalgebra::{Matrix4, Point3, Vector3, Vector4};

/// Labels of the vectors in [`mlab_core::scene::SceneGeometry::displayed_vectors`]
pub const VECTOR_LABELS: [&str; 7] = ["v1", "v2", "v3", "u1", "u2", "u3", "w"];

/// Columns taken by the overlay
pub const PANEL_WIDTH: usize = 46;

fn matrix_rows(title: &str, m: &Matrix4<f32>) -> Vec<String> {
    let mut rows = vec![title.to_string()];
    for r in 0..4 {
        rows.push(format!(
            " {:>8.3} {:>8.3} {:>8.3} {:>8.3}",
            m[(r, 0)],
            m[(r, 1)],
            m[(r, 2)],
            m[(r, 3)]
        ));
    }
    rows
}

fn vec3(v: &Vector3<f32>) -> String {
    format!("({:>7.3}, {:>7.3}, {:>7.3})", v.x, v.y, v.z)
}

fn vec4(v: &Vector4<f32>) -> String {
    format!("({:.2}, {:.2}, {:.2}, {:.2})", v.x, v.y, v.z, v.w)
}

/// Panel contents, one string per terminal row.
///
/// `traced` picks which displayed vector's tip is followed through the
/// pipeline.
pub fn panel_lines(lab: &Lab, frame: &Frame, traced: usize) -> Vec<String> {
    let mut lines = Vec::new();

    lines.extend(matrix_rows("ModelView (cube)", &frame.cube_model_view()));
    lines.extend(matrix_rows(
        &format!("Projection ({:?})", lab.view.projection),
        &frame.projection,
    ));

    lines.push(String::new());
    lines.push(format!("Bases (look-at: {:?})", lab.view.look_at));
    let vectors = lab.scene.displayed_vectors();
    for (label, v) in VECTOR_LABELS.iter().zip(&vectors) {
        lines.push(format!(" {label:<3}{}", vec3(v)));
    }
    lines.push(format!(" a  {}", vec3(&lab.scene.a)));
    lines.push(format!(" b  {}", vec3(&lab.scene.b)));
    if lab.scene.u_basis.is_degenerate() {
        lines.push(" u-basis is degenerate".to_string());
    }
    lines.push(format!(" scale {:.3}", frame.scene_scale));

    let index = traced % vectors.len();
    let trace = frame.trace(&Point3::from(vectors[index]));
    lines.push(String::new());
    lines.push(format!("Pipeline: {}", VECTOR_LABELS[index]));
    lines.push(format!(" view  {}", vec4(&trace.view)));
    lines.push(format!(" clip  {}", vec4(&trace.clip)));
    lines.push(format!(" ndc   {}", vec3(&trace.ndc)));
    lines.push(match trace.screen {
        Some(p) => format!(" screen ({:.1}, {:.1})", p.x, p.y),
        None => " screen -".to_string(),
    });
    lines.push(format!(
        " w ok: {}  in clip box: {}",
        trace.valid_w, trace.inside_clip
    ));

    lines.push(String::new());
    lines.push(format!(
        "Arcball speed {:.3} rad/s{}",
        lab.arcball.angular_speed(),
        if lab.arcball.is_dragging() { " (drag)" } else { "" }
    ));

    lines
        .into_iter()
        .map(|line| line.chars().take(PANEL_WIDTH).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mlab_core::Viewport;

    #[test]
    fn test_panel_contents() {
        let lab = Lab::default();
        let frame = lab.frame(&Viewport::new(100, 40).with_pixel_aspect(0.5));
        let lines = panel_lines(&lab, &frame, 6);

        assert_eq!(lines[0], "ModelView (cube)");
        assert!(lines.iter().any(|l| l == "Pipeline: w"));
        assert!(lines.iter().any(|l| l.starts_with(" b  (")));
        assert!(lines.iter().all(|l| l.chars().count() <= PANEL_WIDTH));
    }

    #[test]
    fn test_trace_index_wraps() {
        let lab = Lab::default();
        let frame = lab.frame(&Viewport::new(100, 40));
        let lines = panel_lines(&lab, &frame, 7);
        assert!(lines.iter().any(|l| l == "Pipeline: v1"));
    }
}
