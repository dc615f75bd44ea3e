use crate::domain::BubbleState;
use rand::Rng;

#[derive(Debug, Clone, Copy)]
pub struct MovementConfig {
    pub step: f32, // px per tick

    // Virtual surface size (visible surface plus the border on each side).
    pub board_width: f32,
    pub board_height: f32,
}

/// Moves a bubble one tick along its heading.
///
/// Bubbles that reach an edge of the virtual surface are clamped back inside and get a
/// fresh heading that points away from that edge, so the returned state is always fully
/// on the board.
pub fn advance<R: Rng + ?Sized>(state: BubbleState, cfg: MovementConfig, rng: &mut R) -> BubbleState {
    let (min_x, max_x) = axis_bounds(state.radius, cfg.board_width);
    let (min_y, max_y) = axis_bounds(state.radius, cfg.board_height);

    let x = state.x + state.heading.cos() * cfg.step;
    let y = state.y + state.heading.sin() * cfg.step;

    let edge_x = edge(x, min_x, max_x);
    let edge_y = edge(y, min_y, max_y);
    if edge_x == Edge::None && edge_y == Edge::None {
        return state.with_position(x, y);
    }

    let heading = bounce(state.heading, edge_x, edge_y, rng);
    state
        .with_position(x.clamp(min_x, max_x), y.clamp(min_y, max_y))
        .with_heading(heading)
}

/// Clamps a state onto the board without changing its heading.
pub fn confine(state: BubbleState, board_width: f32, board_height: f32) -> BubbleState {
    let (min_x, max_x) = axis_bounds(state.radius, board_width);
    let (min_y, max_y) = axis_bounds(state.radius, board_height);
    state.with_position(state.x.clamp(min_x, max_x), state.y.clamp(min_y, max_y))
}

fn axis_bounds(radius: f32, extent: f32) -> (f32, f32) {
    // A bubble wider than the board sits in the middle of that axis.
    if extent < radius * 2.0 {
        let mid = extent / 2.0;
        return (mid, mid);
    }
    (radius, extent - radius)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    None,
    Low,
    High,
}

fn edge(value: f32, min: f32, max: f32) -> Edge {
    if value < min {
        Edge::Low
    } else if value > max {
        Edge::High
    } else {
        Edge::None
    }
}

fn bounce<R: Rng + ?Sized>(heading: f32, edge_x: Edge, edge_y: Edge, rng: &mut R) -> f32 {
    // Re-randomize, then force each blocked component to point back into the board.
    let jitter = rng.random_range(-std::f32::consts::FRAC_PI_4..=std::f32::consts::FRAC_PI_4);
    let turned = heading + std::f32::consts::PI + jitter;
    let (mut dx, mut dy) = (turned.cos(), turned.sin());

    match edge_x {
        Edge::Low => dx = dx.abs(),
        Edge::High => dx = -dx.abs(),
        Edge::None => {}
    }
    match edge_y {
        Edge::Low => dy = dy.abs(),
        Edge::High => dy = -dy.abs(),
        Edge::None => {}
    }

    dy.atan2(dx)
}
