//! Plain-text export of the full state grid.

use std::io::{self, Write};

use limn_core::{Voxel, INSIDE_FAR, OUTSIDE_FAR};
use limn_grid::VolumeDims;

/// Write the state grid as text: first line `"<width> <height> <depth>"`,
/// a blank line, then one block per slice of `height` lines of `width`
/// space-separated integers, blocks separated by a blank line. The far
/// sentinels are encoded as ±9.
pub(crate) fn dump_state_map<W: Write>(
    dims: VolumeDims,
    state: &[i32],
    mut writer: W,
) -> io::Result<()> {
    writeln!(writer, "{} {} {}", dims.width(), dims.height(), dims.depth())?;
    writeln!(writer)?;

    let mut line = String::new();
    for z in 0..dims.depth() as i32 {
        for y in 0..dims.height() as i32 {
            line.clear();
            for x in 0..dims.width() as i32 {
                let tag = match state[dims.flat_index(Voxel::new(x, y, z))] {
                    OUTSIDE_FAR => 9,
                    INSIDE_FAR => -9,
                    tag => tag,
                };
                if x > 0 {
                    line.push(' ');
                }
                line.push_str(&tag.to_string());
            }
            writeln!(writer, "{line}")?;
        }
        writeln!(writer)?;
    }
    Ok(())
}
