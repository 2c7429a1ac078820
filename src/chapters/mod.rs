/*!
 * Chapter units and their on-disk layout.
 *
 * - `segmenter`: splits a concatenated dump into chapter units
 * - `store`: reads and writes `ch_<N>.txt` files for sources and translations
 */

pub use self::segmenter::{ChapterMarker, ChapterUnit, Segmenter};
pub use self::store::{ChapterOutput, ChapterStore};

pub mod segmenter;
pub mod store;
