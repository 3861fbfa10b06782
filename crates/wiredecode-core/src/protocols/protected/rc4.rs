/// RC4 stream cipher state.
///
/// # Examples
/// ```
/// use wiredecode_core::protocols::protected::Rc4;
///
/// let mut data = *b"Plaintext";
/// Rc4::new(b"Key").apply_keystream(&mut data);
/// assert_eq!(data, [0xbb, 0xf3, 0x16, 0xe8, 0xd9, 0x40, 0xaf, 0x0a, 0xd3]);
/// ```
#[derive(Clone)]
pub struct Rc4 {
    state: [u8; 256],
    i: u8,
    j: u8,
}

impl Rc4 {
    /// Key scheduling. An empty key leaves the identity permutation.
    pub fn new(key: &[u8]) -> Self {
        let mut state = [0u8; 256];
        for (index, slot) in state.iter_mut().enumerate() {
            *slot = index as u8;
        }
        let mut j = 0u8;
        for (i, k) in (0..state.len()).zip(key.iter().cycle()) {
            j = j.wrapping_add(state[i]).wrapping_add(*k);
            state.swap(i, usize::from(j));
        }
        Self { state, i: 0, j: 0 }
    }

    /// XOR the next `data.len()` keystream bytes into `data`.
    pub fn apply_keystream(&mut self, data: &mut [u8]) {
        for byte in data {
            self.i = self.i.wrapping_add(1);
            let i = usize::from(self.i);
            self.j = self.j.wrapping_add(self.state[i]);
            let j = usize::from(self.j);
            self.state.swap(i, j);
            let k = self.state[usize::from(self.state[i].wrapping_add(self.state[j]))];
            *byte ^= k;
        }
    }
}
