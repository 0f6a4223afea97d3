/*! Reading and querying HFST optimized-lookup transducers.

Loads the optimized-lookup binary format (`.hfstol`) produced by
[`HFST`] and answers lookups against it: a word is split into the
transducer's input symbols, and every path that consumes it and ends in a
final state yields an analysis with a weight.

[`HFST`]: (https://hfst.github.io)

# Usage examples

```no_run
let file = std::fs::File::open("analyser.hfstol")?;
let transducer = hfstol::load(file)?;

if let Some((analysis, weight)) = transducer.lookup("kissa") {
    println!("{}\t{}", analysis, weight);
}
# Ok::<(), Box<dyn std::error::Error>>(())
```

All analyses, with flag diacritics enforced, come from
[`analysis::Analyser`]. The `hfstol` binary in the same repository is a
command-line front end for both.
*/

pub mod analysis;
pub mod constants;
pub mod encoder;
pub mod transducer;
pub mod types;
pub mod vfs;

#[cfg(test)]
pub(crate) mod fixture;

use std::io::Read;

pub use crate::transducer::{Transducer, TransducerError};

/// Read a transducer from a byte stream.
pub fn load<R: Read>(source: R) -> Result<Transducer, TransducerError> {
    Transducer::from_reader(source)
}
