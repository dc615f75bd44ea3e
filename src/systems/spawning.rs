use crate::domain::{BubbleState, BoardTuning};
use rand::Rng;

/// Picks a spawn center uniformly over the border ring around the visible surface.
///
/// The result is in virtual coordinates and never lies inside the visible surface, so a
/// new bubble cannot appear on top of the player.
pub fn border_position<R: Rng + ?Sized>(
    screen_width: f32,
    screen_height: f32,
    border: f32,
    rng: &mut R,
) -> (f32, f32) {
    let board_width = screen_width + 2.0 * border;
    let board_height = screen_height + 2.0 * border;

    // Top and bottom strips span the full board width; left and right fill the gap.
    let horizontal = board_width * border;
    let vertical = border * screen_height;
    let total = 2.0 * (horizontal + vertical);

    let mut pick = rng.random::<f32>() * total;
    let u = rng.random::<f32>();
    let v = rng.random::<f32>();

    if pick < horizontal {
        return (u * board_width, v * border);
    }
    pick -= horizontal;
    if pick < horizontal {
        return (u * board_width, border + screen_height + v * border);
    }
    pick -= horizontal;
    if pick < vertical {
        return (u * border, border + v * screen_height);
    }
    (border + screen_width + u * border, border + v * screen_height)
}

/// Counts opponents strictly larger than `radius`.
pub fn count_larger_than<'a>(opponents: impl IntoIterator<Item = &'a BubbleState>, radius: f32) -> usize {
    opponents.into_iter().filter(|b| b.radius > radius).count()
}

/// Upper radius bound for the next spawn.
///
/// Once more than half the population slots hold bubbles bigger than the player, new
/// bubbles are no larger than the player so the game stays winnable.
pub fn spawn_radius_cap(larger_than_player: usize, player_radius: f32, tuning: &BoardTuning) -> f32 {
    if larger_than_player > tuning.max_population / 2 {
        player_radius.clamp(tuning.min_radius, tuning.max_radius)
    } else {
        tuning.max_radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BubbleColor;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn spawn_positions_stay_in_the_border_ring() {
        let mut rng = Pcg32::seed_from_u64(11);
        let (w, h, border) = (800.0, 480.0, 150.0);

        for _ in 0..10_000 {
            let (x, y) = border_position(w, h, border, &mut rng);
            assert!((0.0..=w + 2.0 * border).contains(&x));
            assert!((0.0..=h + 2.0 * border).contains(&y));

            let inside_visible = x > border && x < border + w && y > border && y < border + h;
            assert!(!inside_visible, "spawned on screen at ({x}, {y})");
        }
    }

    #[test]
    fn cap_drops_to_player_size_when_big_bubbles_dominate() {
        let tuning = BoardTuning {
            max_population: 6,
            ..BoardTuning::default()
        };

        assert_eq!(spawn_radius_cap(3, 20.0, &tuning), tuning.max_radius);
        assert_eq!(spawn_radius_cap(4, 20.0, &tuning), 20.0);
    }

    #[test]
    fn counts_only_strictly_larger_opponents() {
        let bubbles = [10.0, 20.0, 20.0, 30.0, 45.0]
            .map(|r| BubbleState::new(BubbleColor::WHITE, 0.0, 0.0, r, 0.0));

        assert_eq!(count_larger_than(&bubbles, 20.0), 2);
        assert_eq!(count_larger_than(&bubbles, 50.0), 0);
    }
}
