use std::io;
use std::thread;

use macho_audit::{macho, Endianness, ErrorKind, MachOClass, MachOObject, MapMode, OpenOptions};

use crate::fixture::{self, Image};

fn image() -> Vec<u8> {
    Image::new(Endianness::Little, true)
        .flags(macho::MH_PIE)
        .segment("__TEXT", 0x1_0000_0000, 0x4000, 5, 5)
        .command(macho::LC_SOURCE_VERSION, 16)
        .build()
}

#[test]
fn open_single() {
    let data = image();
    let temp = fixture::temp_file(&data);
    for map_mode in [MapMode::Mmap, MapMode::Read] {
        let options = OpenOptions::default().map_mode(map_mode);
        let file = MachOObject::open_with(temp.path(), &options).unwrap();
        assert_eq!(file.path(), temp.path());
        assert_eq!(
            file.base_name(),
            temp.path().file_name().unwrap().to_str().unwrap()
        );
        assert_eq!(file.class(), MachOClass::MachO64);
        assert_eq!(file.endian(), Endianness::Little);
        assert_eq!(file.len(), data.len() as u64);
        assert!(!file.is_empty());
        assert_eq!(file.data(), &data[..]);

        let arches = file.architectures().unwrap();
        assert_eq!(arches.len(), 1);
        assert_eq!(arches[0].size(), file.len());
        assert!(arches[0].properties().unwrap().pie);
        assert_eq!(arches[0].commands().unwrap().count(), 2);
        file.release();
    }
}

#[test]
fn open_fat() {
    let data = fixture::fat(
        Endianness::Big,
        false,
        &[
            (macho::CPU_TYPE_X86_64, image()),
            (
                macho::CPU_TYPE_ARM64,
                Image::new(Endianness::Little, true)
                    .cputype(macho::CPU_TYPE_ARM64)
                    .build(),
            ),
        ],
    );
    let temp = fixture::temp_file(&data);
    let file = MachOObject::open(temp.path()).unwrap();
    assert_eq!(file.class(), MachOClass::Fat);
    let cputypes: Vec<_> = file
        .architectures()
        .unwrap()
        .iter()
        .map(|arch| arch.header().unwrap().cputype)
        .collect();
    assert_eq!(cputypes, [macho::CPU_TYPE_X86_64, macho::CPU_TYPE_ARM64]);
}

#[test]
fn open_errors() {
    let dir = tempfile::tempdir().unwrap();
    let error = MachOObject::open(dir.path().join("missing")).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::NotFound);

    let temp = fixture::temp_file(b"");
    let error = MachOObject::open(temp.path()).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Io(io::ErrorKind::UnexpectedEof));

    let temp = fixture::temp_file(b"\x7fELF\x02\x01\x01\0");
    let error = MachOObject::open(temp.path()).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::InvalidMagic);

    let temp = fixture::temp_file(b"\xcf\xfa");
    let error = MachOObject::open(temp.path()).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::InvalidMagic);

    // A truncated header is only detected when the slice is parsed.
    let temp = fixture::temp_file(&image()[..20]);
    let file = MachOObject::open(temp.path()).unwrap();
    let arches = file.architectures().unwrap();
    assert_eq!(
        arches[0].header().unwrap_err().kind(),
        ErrorKind::TruncatedHeader
    );
}

#[test]
fn open_too_large() {
    let data = image();
    let temp = fixture::temp_file(&data);
    let options = OpenOptions::default().max_size(Some(data.len() as u64 - 1));
    let error = MachOObject::open_with(temp.path(), &options).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::TooLarge);

    let options = OpenOptions::default().max_size(Some(data.len() as u64));
    assert!(MachOObject::open_with(temp.path(), &options).is_ok());
}

#[test]
fn open_in_threads() {
    let temps: Vec<_> = (0..4)
        .map(|i| {
            let image = Image::new(Endianness::Little, true);
            let image = (0..i).fold(image, |image, _| {
                image.command(macho::LC_SOURCE_VERSION, 16)
            });
            fixture::temp_file(&image.build())
        })
        .collect();
    let counts: Vec<usize> = thread::scope(|scope| {
        let handles: Vec<_> = temps
            .iter()
            .map(|temp| {
                scope.spawn(move || {
                    let file = MachOObject::open(temp.path()).unwrap();
                    let arches = file.architectures().unwrap();
                    arches[0].commands().unwrap().count()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect()
    });
    assert_eq!(counts, [0, 1, 2, 3]);
}
