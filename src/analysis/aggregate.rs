use super::report::{FormatDetails, SolutionQuality};
use crate::parser::XyzStatistics;

/// Builds the XYZ-only report blocks from the file statistics.
pub fn xyz_details(statistics: XyzStatistics) -> FormatDetails {
    let solution_quality = SolutionQuality {
        std_dev_x: statistics.mean_accuracy.x,
        std_dev_y: statistics.mean_accuracy.y,
        std_dev_z: statistics.mean_accuracy.z,
    };
    FormatDetails::Xyz {
        xyz_stats: statistics,
        solution_quality,
    }
}
