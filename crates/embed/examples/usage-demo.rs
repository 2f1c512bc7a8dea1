use embed::prelude::*;
use log::info;

type AppResult = Result<(), Box<dyn std::error::Error>>;

fn main() -> AppResult {
    // First, we want to prepare some logging, so that we can see
    // the output of what's going on.
    env_logger::init();

    // Next we need a curve collection. We use the constructed spike
    // family here; real callers would load their own polylines, one
    // `double[vertex][coordinate]` array per curve.
    let curves = testdata::shifted_spikes(1.0, 0.1);
    info!("embedding {} curves", curves.len());

    // The direct embedder feeds pairwise distances straight into MDS.
    // We compare curves by their discrete Fréchet distance; the measure
    // is stateless, so it can be shared freely.
    let mut direct = DirectEmbedder::new(curves.clone(), DiscreteFrechet::maximum())?;

    // Landmark mode only computes distances against a random subset,
    // which is what makes large collections tractable.
    direct.use_landmarks(true);
    direct.set_landmark_count(40)?;

    let coordinates = direct.embed(2)?;
    info!(
        "direct embedding spans {} points, quality {:.4}",
        coordinates[0].len(),
        direct.embedding_quality(2)?
    );

    // Isomap replaces the raw measure by geodesic distances along an
    // approximate k-nearest-neighbor graph. With the continuous Fréchet
    // approximation as the measure this is the full pipeline: NN-descent,
    // component unification, per-landmark shortest paths, landmark MDS.
    let measure = FrechetDistance::new(1e-3)?;
    let mut isomap = Isomap::new(curves, measure, 6)?;
    isomap.use_landmarks(true);
    isomap.set_landmark_count(40)?;

    let coordinates = isomap.embed(2)?;
    info!(
        "isomap embedding spans {} points, quality {:.4}",
        coordinates[0].len(),
        isomap.embedding_quality(2)?
    );

    // Changing k keeps the NN-descent state as a warm start; only the
    // geodesic matrix is recomputed.
    isomap.set_neighbor_count(8)?;
    info!("after k change: quality {:.4}", isomap.embedding_quality(2)?);

    Ok(())
}
