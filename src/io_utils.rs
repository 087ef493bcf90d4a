use std::io::{BufWriter, Write};

const DEFAULT_BUFFER_SIZE: usize = 4 * 1024 * 1024;

pub fn new_bufwriter<T: Write>(item: T) -> BufWriter<T> {
    BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, item)
}
