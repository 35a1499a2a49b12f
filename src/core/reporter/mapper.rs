//! Maps clustered indices back to caller-supplied metadata.

use super::{DedupReport, PhotoEntry, PhotoGroup};
use crate::core::comparator::Clustering;
use crate::core::source::LoadedImage;
use crate::error::DedupError;
use std::collections::HashMap;

fn entry_for(index: usize, images: &HashMap<usize, LoadedImage>) -> Result<PhotoEntry, DedupError> {
    let image = images.get(&index).ok_or_else(|| {
        DedupError::Pipeline(format!("clustered index {} has no loaded record", index))
    })?;

    Ok(PhotoEntry {
        src: image.record.original_src.clone(),
        name: image.record.display_name.clone(),
        size: image.byte_size,
    })
}

/// Shape a clustering into the response report.
///
/// Group and member order is taken from the clustering unchanged. An index
/// without a loaded record is an internal fault and yields no partial report.
pub fn materialize(
    clustering: &Clustering,
    images: &HashMap<usize, LoadedImage>,
) -> Result<DedupReport, DedupError> {
    let groups = clustering
        .groups
        .iter()
        .map(|members| {
            let photos = members
                .iter()
                .map(|&index| entry_for(index, images))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(PhotoGroup { photos })
        })
        .collect::<Result<Vec<_>, DedupError>>()?;

    let others = clustering
        .others
        .iter()
        .map(|&index| entry_for(index, images))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DedupReport { groups, others })
}
