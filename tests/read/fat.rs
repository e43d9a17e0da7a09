use macho_audit::{
    architectures, classify, macho, Bitness, Endianness, ErrorKind, MachOClass,
};

use crate::fixture::{self, Image, FAT_ALIGN};

fn ppc_image() -> Vec<u8> {
    Image::new(Endianness::Big, false)
        .cputype(macho::CPU_TYPE_POWERPC)
        .command(macho::LC_SYMTAB, 24)
        .build()
}

fn x86_64_image() -> Vec<u8> {
    Image::new(Endianness::Little, true)
        .command(macho::LC_UUID, 24)
        .command(macho::LC_SOURCE_VERSION, 16)
        .build()
}

#[test]
fn mixed_architectures() {
    let ppc = ppc_image();
    let x86_64 = x86_64_image();
    let data = fixture::fat(
        Endianness::Big,
        false,
        &[
            (macho::CPU_TYPE_POWERPC, ppc.clone()),
            (macho::CPU_TYPE_X86_64, x86_64.clone()),
        ],
    );
    let (class, endian) = classify(&data).unwrap();
    assert_eq!(class, MachOClass::Fat);
    assert_eq!(endian, Endianness::Big);

    let arches = architectures(&data, class, endian).unwrap();
    assert_eq!(arches.len(), 2);

    let first = &arches[0];
    assert_eq!(first.offset(), FAT_ALIGN as u64);
    assert_eq!(first.size(), ppc.len() as u64);
    assert_eq!(first.data(), &ppc[..]);
    assert_eq!(first.bitness(), Bitness::Bits32);
    assert_eq!(first.endian(), Endianness::Big);
    let fat_arch = first.fat_arch().unwrap();
    assert_eq!(fat_arch.cputype, macho::CPU_TYPE_POWERPC);
    assert_eq!(fat_arch.align, 12);
    assert_eq!(first.header().unwrap().cputype, macho::CPU_TYPE_POWERPC);
    let sizes: Vec<_> = first
        .commands()
        .unwrap()
        .map(|command| command.unwrap().cmdsize())
        .collect();
    assert_eq!(sizes, [24]);

    let second = &arches[1];
    assert_eq!(second.offset(), 2 * FAT_ALIGN as u64);
    assert_eq!(second.data(), &x86_64[..]);
    assert_eq!(second.bitness(), Bitness::Bits64);
    assert!(second.is_64());
    assert_eq!(second.endian(), Endianness::Little);
    assert_eq!(second.fat_arch().unwrap().cputype, macho::CPU_TYPE_X86_64);
    let sizes: Vec<_> = second
        .commands()
        .unwrap()
        .map(|command| command.unwrap().cmdsize())
        .collect();
    assert_eq!(sizes, [24, 16]);

    for arch in &arches {
        assert!(arch.offset() + arch.size() <= data.len() as u64);
    }
}

#[test]
fn little_endian_table() {
    let data = fixture::fat(
        Endianness::Little,
        false,
        &[(macho::CPU_TYPE_X86_64, x86_64_image())],
    );
    assert_eq!(&data[..4], b"\xbe\xba\xfe\xca");
    let (class, endian) = classify(&data).unwrap();
    assert_eq!((class, endian), (MachOClass::Fat, Endianness::Little));
    let arches = architectures(&data, class, endian).unwrap();
    assert_eq!(arches.len(), 1);
    assert_eq!(arches[0].offset(), FAT_ALIGN as u64);
    assert_eq!(arches[0].fat_arch().unwrap().cputype, macho::CPU_TYPE_X86_64);
}

#[test]
fn fat64_table() {
    let data = fixture::fat(
        Endianness::Big,
        true,
        &[
            (macho::CPU_TYPE_X86_64, x86_64_image()),
            (macho::CPU_TYPE_POWERPC, ppc_image()),
            (macho::CPU_TYPE_X86_64, x86_64_image()),
        ],
    );
    let (class, endian) = classify(&data).unwrap();
    assert_eq!(class, MachOClass::Fat64);
    assert!(class.is_fat());
    let arches = architectures(&data, class, endian).unwrap();
    let offsets: Vec<_> = arches.iter().map(|arch| arch.offset()).collect();
    assert_eq!(
        offsets,
        [FAT_ALIGN as u64, 2 * FAT_ALIGN as u64, 3 * FAT_ALIGN as u64]
    );
    let bitness: Vec<_> = arches.iter().map(|arch| arch.bitness()).collect();
    assert_eq!(bitness, [Bitness::Bits64, Bitness::Bits32, Bitness::Bits64]);
}

#[test]
fn too_many_architectures() {
    for nfat_arch in [3, 1000, u32::MAX] {
        // Room for exactly two entries after the header.
        let data = fixture::fat_table(Endianness::Big, false, nfat_arch, &[], 8 + 2 * 20);
        let (class, endian) = classify(&data).unwrap();
        let error = architectures(&data, class, endian).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::TooManyArchitectures, "{}", nfat_arch);
    }
}

#[test]
fn truncated_fat_header() {
    // Only the magic.
    let data = fixture::fat_table(Endianness::Big, false, 0, &[], 0);
    let error = architectures(&data[..4], MachOClass::Fat, Endianness::Big).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::TruncatedFatHeader);

    // No entries.
    let error = architectures(&data, MachOClass::Fat, Endianness::Big).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::TruncatedFatHeader);

    let cases = [
        // Past the end of the file.
        (0x1000, 0x100),
        (0x80, 0x1000),
        // Overflows.
        (0xffff_fff0, 0x100),
        // Overlaps the fat table.
        (0, 0x20),
        (27, 0x20),
    ];
    for (offset, size) in cases {
        let data = fixture::fat_table(Endianness::Big, false, 1, &[(offset, size)], 0x1000);
        let (class, endian) = classify(&data).unwrap();
        let error = architectures(&data, class, endian).unwrap_err();
        assert_eq!(
            error.kind(),
            ErrorKind::TruncatedFatHeader,
            "offset {:#x} size {:#x}",
            offset,
            size
        );
    }
}

#[test]
fn fat64_too_many_architectures() {
    // Two 20 byte entries fit, but two 32 byte entries do not.
    let len = 8 + 2 * 20;
    let data = fixture::fat_table(Endianness::Big, false, 2, &[], len);
    let error = architectures(&data, MachOClass::Fat, Endianness::Big).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::TruncatedFatHeader);

    for nfat_arch in [2, u32::MAX] {
        let data = fixture::fat_table(Endianness::Big, true, nfat_arch, &[], len);
        let (class, endian) = classify(&data).unwrap();
        assert_eq!(class, MachOClass::Fat64);
        let error = architectures(&data, class, endian).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::TooManyArchitectures, "{}", nfat_arch);
    }
}

#[test]
fn fat64_truncated_fat_header() {
    let cases = [
        (u64::MAX - 1, 0x100),
        (0x100, u64::MAX),
        (u64::MAX, u64::MAX),
        (0x1_0000_0000, 0x100),
        (0x1000, 0x100),
        // Overlaps the fat table.
        (39, 0x20),
    ];
    for (offset, size) in cases {
        let data = fixture::fat_table(Endianness::Little, true, 1, &[(offset, size)], 0x1000);
        let (class, endian) = classify(&data).unwrap();
        assert_eq!((class, endian), (MachOClass::Fat64, Endianness::Little));
        let error = architectures(&data, class, endian).unwrap_err();
        assert_eq!(
            error.kind(),
            ErrorKind::TruncatedFatHeader,
            "offset {:#x} size {:#x}",
            offset,
            size
        );
    }
}

#[test]
fn slice_at_table_end() {
    let image = x86_64_image();
    for (is_64, table_end) in [(false, 8 + 20), (true, 8 + 32)] {
        let mut data = fixture::fat_table(
            Endianness::Big,
            is_64,
            1,
            &[(table_end, image.len() as u64)],
            0,
        );
        assert_eq!(data.len() as u64, table_end);
        data.extend_from_slice(&image);
        let (class, endian) = classify(&data).unwrap();
        let arches = architectures(&data, class, endian).unwrap();
        assert_eq!(arches.len(), 1);
        assert_eq!(arches[0].offset(), table_end);
        assert_eq!(arches[0].data(), &image[..]);
        assert_eq!(arches[0].commands().unwrap().count(), 2);
    }
}

#[test]
fn invalid_slice_magic() {
    // A slice of zeros.
    let data = fixture::fat_table(Endianness::Big, false, 1, &[(0x100, 0x100)], 0x200);
    let (class, endian) = classify(&data).unwrap();
    let error = architectures(&data, class, endian).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::InvalidMagic);

    // A nested fat file.
    let nested = fixture::fat(Endianness::Big, false, &[(macho::CPU_TYPE_X86_64, x86_64_image())]);
    let data = fixture::fat(Endianness::Big, false, &[(macho::CPU_TYPE_X86_64, nested)]);
    let (class, endian) = classify(&data).unwrap();
    let error = architectures(&data, class, endian).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::InvalidMagic);
}

#[test]
fn unknown_class() {
    let error = architectures(b"\0\0\0\0", MachOClass::Unknown, Endianness::Big).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::InvalidMagic);
}
