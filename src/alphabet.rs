/// A dense byte-to-rank mapping over the symbols a tree may contain.
///
/// Child maps are indexed by rank, so the alphabet must cover every byte of
/// the text a builder is given. [`Alphabet::from_text`] derives a covering
/// alphabet from the input itself; the presets below cover the common ASCII
/// cases.
#[derive(Clone)]
pub struct Alphabet {
    symbols: Vec<u8>,
    ranks: [Option<u8>; 256],
}

impl Alphabet {
    /// Builds an alphabet from an explicit symbol list. Ranks follow the
    /// order of `symbols`.
    pub fn new(symbols: &[u8]) -> Alphabet {
        let mut ranks = [None; 256];
        for (i, &symbol) in symbols.iter().enumerate() {
            assert!(ranks[symbol as usize].is_none(), "symbol appears twice in alphabet");
            ranks[symbol as usize] = Some(i as u8);
        }

        Alphabet {
            symbols: symbols.to_vec(),
            ranks,
        }
    }

    /// Collects the distinct bytes of `data` in order of first appearance.
    pub fn from_text(data: &[u8]) -> Alphabet {
        let mut symbols = Vec::new();
        let mut ranks = [None; 256];
        for &byte in data {
            if ranks[byte as usize].is_none() {
                ranks[byte as usize] = Some(symbols.len() as u8);
                symbols.push(byte);
            }
        }

        Alphabet { symbols, ranks }
    }

    pub fn size(&self) -> usize {
        self.symbols.len()
    }

    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }

    pub fn contains(&self, symbol: u8) -> bool {
        self.ranks[symbol as usize].is_some()
    }

    pub fn rank_of_symbol(&self, symbol: u8) -> u8 {
        self.ranks[symbol as usize].expect("symbol outside alphabet")
    }

    pub fn symbol_of_rank(&self, rank: u8) -> u8 {
        self.symbols[rank as usize]
    }
}

lazy_static! {
    pub static ref ASCII_LOWERCASE: Alphabet = Alphabet::new(b"abcdefghijklmnopqrstuvwxyz");
    pub static ref ASCII_UPPERCASE: Alphabet = Alphabet::new(b"ABCDEFGHIJKLMNOPQRSTUVWXYZ");
    pub static ref ASCII: Alphabet =
        Alphabet::new(b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ");
}
