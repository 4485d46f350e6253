use hoard_crypto::{stretch_password, BlockCipher, Blowfish, CipherBlockChain};

fn make_data(size: usize) -> Vec<u8> {
    (0..size)
        .map(|i| (i.wrapping_mul(7) ^ (i >> 3)) as u8)
        .collect()
}

fn keyed_chain() -> CipherBlockChain<Blowfish> {
    let key = stretch_password(b"bench password");
    let mut cbc = CipherBlockChain::new(Blowfish::new());
    cbc.set_key(key.as_bytes(), key.bits()).unwrap();
    cbc
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_cbc_encrypt(bencher: divan::Bencher, size: usize) {
    let data = make_data(size);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .with_inputs(|| (keyed_chain(), data.clone()))
        .bench_local_values(|(mut cbc, mut buf)| {
            cbc.encrypt(divan::black_box(&mut buf)).unwrap();
            buf
        });
}

#[divan::bench(args = [1024, 65536, 1048576])]
fn bench_cbc_decrypt(bencher: divan::Bencher, size: usize) {
    let mut encrypted = make_data(size);
    keyed_chain().encrypt(&mut encrypted).unwrap();
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .with_inputs(|| (keyed_chain(), encrypted.clone()))
        .bench_local_values(|(mut cbc, mut buf)| {
            cbc.decrypt(divan::black_box(&mut buf)).unwrap();
            buf
        });
}

#[divan::bench]
fn bench_set_key() -> Blowfish {
    Blowfish::with_key(divan::black_box(b"sixteen byte key")).unwrap()
}

#[divan::bench(args = [8, 24, 40, 64])]
fn bench_stretch_password(password_len: usize) -> usize {
    let password = vec![b'p'; password_len];
    stretch_password(divan::black_box(&password)).len()
}

fn main() {
    divan::main();
}
