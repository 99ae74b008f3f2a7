//! Draw from a 2-D grid with a ridge, then complete half-specified points.
//!
//! The joint draw should concentrate along the ridge; the conditional draw shows
//! how the free axis shifts with the fixed one.

use latsample::{Grid, PartialPoint, SamplerConfig, Session};
use ndarray::array;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let knots = vec![vec![0.0, 1.0, 2.0, 3.0], vec![0.0, 1.0, 2.0]];
    // weights[x][y]: a ridge running from low y at x=0 to high y at x=3.
    let weights = array![
        [4.0, 1.0, 0.0],
        [2.0, 3.0, 0.5],
        [0.5, 3.0, 2.0],
        [0.0, 1.0, 4.0],
    ];
    let grid = Grid::new(knots, weights.into_dyn())?;
    let mut session = Session::with_config(grid, SamplerConfig::new().with_seed(7));

    let joint = session.draw(10_000)?;
    let mean_x = joint.iter().map(|p| p[0]).sum::<f64>() / joint.len() as f64;
    let mean_y = joint.iter().map(|p| p[1]).sum::<f64>() / joint.len() as f64;
    println!("joint: n={} mean=({mean_x:.3}, {mean_y:.3})", joint.len());

    for &x in &[0.0, 1.5, 3.0] {
        let mut slots: Vec<PartialPoint> = (0..5_000)
            .map(|_| PartialPoint::from_options(&[Some(x), None]))
            .collect();
        for outcome in session.draw_into(&mut slots) {
            outcome?;
        }
        let mean = slots.iter().map(|p| p.values()[1]).sum::<f64>() / slots.len() as f64;
        println!("y | x={x:.1}: mean={mean:.3}");
    }

    let (hits, misses) = session.cache_stats();
    println!(
        "cache: {} cells, {hits} hits, {misses} misses",
        session.cached_cells()
    );
    Ok(())
}
