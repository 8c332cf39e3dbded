use strangerq_keygen::{bytes_to_bits, bytes_to_hex, bytes_to_key, six_bit_chunks};

fn main() {
    // The same 16-byte draw the interactive key generator starts from.
    let bytes: Vec<u8> = (0..16).map(|i| i * 17).collect();

    let hex = bytes_to_hex(&bytes);
    let bits = bytes_to_bits(&bytes);
    let chunks = six_bit_chunks(&bits);
    let key = bytes_to_key(&bytes, 12).expect("non-empty input");

    println!("hex    : {hex}");
    println!("bits   : {bits}");
    println!(
        "chunks : {}",
        chunks
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    );
    println!("key    : {key}");
}
