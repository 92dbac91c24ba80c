use crate::bitwise::Rotate;
use crate::memory::{CARTRIDGE_MIRRORS, FIXED_REGIONS, MemoryError, Region};

pub struct InternalMemory {
    /// From 0x00000000 to 0x00003FFF (16 KBytes).
    bios_system_rom: Vec<u8>,

    /// From 0x02000000 to 0x0203FFFF (256 KBytes).
    board_work_ram: Vec<u8>,

    /// From 0x03000000 to 0x03007FFF (32 KBytes).
    chip_work_ram: Vec<u8>,

    /// From 0x04000000 to 0x040003FE. Plain storage, no register semantics.
    io_registers: Vec<u8>,

    /// From 0x05000000 to 0x050003FF (BG and OBJ palettes).
    palette_ram: Vec<u8>,

    /// From 0x06000000 to 0x06017FFF (96 KBytes).
    video_ram: Vec<u8>,

    /// From 0x07000000 to 0x070003FF.
    object_attributes: Vec<u8>,

    /// Mirrored at 0x08000000, 0x0A000000 and 0x0C000000.
    cartridge_rom: Vec<u8>,
}

impl Default for InternalMemory {
    fn default() -> Self {
        Self::new()
    }
}

impl InternalMemory {
    #[must_use]
    pub fn new() -> Self {
        Self {
            bios_system_rom: vec![0; Region::Bios.size()],
            board_work_ram: vec![0; Region::BoardWorkRam.size()],
            chip_work_ram: vec![0; Region::ChipWorkRam.size()],
            io_registers: vec![0; Region::IoRegisters.size()],
            palette_ram: vec![0; Region::PaletteRam.size()],
            video_ram: vec![0; Region::VideoRam.size()],
            object_attributes: vec![0; Region::ObjectAttributes.size()],
            cartridge_rom: Vec::new(),
        }
    }

    /// Copies a cartridge image into ROM. The mirrors cover exactly its length.
    pub fn load_rom(&mut self, image: &[u8]) {
        tracing::debug!(len = image.len(), "loading cartridge image");
        self.cartridge_rom = image.to_vec();
    }

    /// Resolves an address to its backing region and the offset inside it.
    pub fn locate(&self, address: u32) -> Result<(Region, usize), MemoryError> {
        if let Some((start, _, region)) = FIXED_REGIONS
            .iter()
            .find(|(start, end, _)| (*start..=*end).contains(&address))
        {
            return Ok((*region, (address - start) as usize));
        }

        CARTRIDGE_MIRRORS
            .iter()
            .filter(|base| address >= **base)
            .map(|base| (address - base) as usize)
            .find(|offset| *offset < self.cartridge_rom.len())
            .map(|offset| (Region::CartridgeRom, offset))
            .ok_or(MemoryError::UnmappedAccess { address })
    }

    fn bytes(&self, region: Region) -> &[u8] {
        match region {
            Region::Bios => &self.bios_system_rom,
            Region::BoardWorkRam => &self.board_work_ram,
            Region::ChipWorkRam => &self.chip_work_ram,
            Region::IoRegisters => &self.io_registers,
            Region::PaletteRam => &self.palette_ram,
            Region::VideoRam => &self.video_ram,
            Region::ObjectAttributes => &self.object_attributes,
            Region::CartridgeRom => &self.cartridge_rom,
        }
    }

    fn bytes_mut(&mut self, region: Region, address: u32) -> Result<&mut [u8], MemoryError> {
        Ok(match region {
            Region::Bios => &mut self.bios_system_rom,
            Region::BoardWorkRam => &mut self.board_work_ram,
            Region::ChipWorkRam => &mut self.chip_work_ram,
            Region::IoRegisters => &mut self.io_registers,
            Region::PaletteRam => &mut self.palette_ram,
            Region::VideoRam => &mut self.video_ram,
            Region::ObjectAttributes => &mut self.object_attributes,
            Region::CartridgeRom => return Err(MemoryError::ReadOnlyViolation { address }),
        })
    }

    pub fn read_at(&self, address: u32) -> Result<u8, MemoryError> {
        let (region, offset) = self.locate(address)?;
        Ok(self.bytes(region)[offset])
    }

    pub fn write_at(&mut self, address: u32, value: u8) -> Result<(), MemoryError> {
        let (region, offset) = self.locate(address)?;
        self.bytes_mut(region, address)?[offset] = value;
        Ok(())
    }

    pub fn read_half_word(&self, address: u32) -> Result<u16, MemoryError> {
        let lo = self.read_at(address)?;
        let hi = self.read_at(address.wrapping_add(1))?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    /// Reads the word containing `address` and rotates it so that the
    /// addressed byte ends up in the low byte, as a misaligned LDR does.
    pub fn read_word(&self, address: u32) -> Result<u32, MemoryError> {
        let aligned = address & !0b11;
        let mut bytes = [0; 4];
        for (i, byte) in (0..).zip(bytes.iter_mut()) {
            *byte = self.read_at(aligned + i)?;
        }

        Ok(u32::from_le_bytes(bytes).rotate_right_by(8 * (address & 0b11)))
    }

    pub fn write_half_word(&mut self, address: u32, value: u16) -> Result<(), MemoryError> {
        self.write_bytes(address & !0b1, &value.to_le_bytes())
    }

    pub fn write_word(&mut self, address: u32, value: u32) -> Result<(), MemoryError> {
        self.write_bytes(address & !0b11, &value.to_le_bytes())
    }

    /// Every byte is located and checked before the first one is stored, so a
    /// faulting write leaves memory untouched.
    fn write_bytes(&mut self, start: u32, bytes: &[u8]) -> Result<(), MemoryError> {
        for (i, _) in (0_u32..).zip(bytes) {
            let address = start.wrapping_add(i);
            if self.locate(address)?.0 == Region::CartridgeRom {
                return Err(MemoryError::ReadOnlyViolation { address });
            }
        }

        for (i, value) in (0_u32..).zip(bytes) {
            self.write_at(start.wrapping_add(i), *value)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const WRITABLE_BASES: [(u32, Region); 7] = [
        (0x0000_0000, Region::Bios),
        (0x0200_0000, Region::BoardWorkRam),
        (0x0300_0000, Region::ChipWorkRam),
        (0x0400_0000, Region::IoRegisters),
        (0x0500_0000, Region::PaletteRam),
        (0x0600_0000, Region::VideoRam),
        (0x0700_0000, Region::ObjectAttributes),
    ];

    #[test]
    fn test_word_round_trip_at_region_edges() {
        let mut memory = InternalMemory::default();

        for (base, region) in WRITABLE_BASES {
            // The I/O block ends at 0x3FE, so its last full word starts 8 bytes in.
            let tail = if region == Region::IoRegisters { 8 } else { 4 };
            let last = base + u32::try_from(region.size()).unwrap() - tail;

            for (address, value) in [(base, 0xDEAD_BEEF), (last, 0x0123_4567)] {
                memory.write_word(address, value).unwrap();
                assert_eq!(memory.read_word(address).unwrap(), value, "at 0x{address:08X}");
            }
        }
    }

    #[test]
    fn test_little_endian_layout() {
        let mut memory = InternalMemory::default();
        memory.write_word(0x0300_0010, 0xAABB_CCDD).unwrap();

        assert_eq!(memory.read_at(0x0300_0010).unwrap(), 0xDD);
        assert_eq!(memory.read_at(0x0300_0013).unwrap(), 0xAA);
        assert_eq!(memory.read_half_word(0x0300_0010).unwrap(), 0xCCDD);
        assert_eq!(memory.read_half_word(0x0300_0012).unwrap(), 0xAABB);
    }

    #[test]
    fn test_unaligned_word_read_rotates() {
        let mut memory = InternalMemory::default();
        memory.write_word(0x0200_0000, 0xAABB_CCDD).unwrap();

        assert_eq!(memory.read_word(0x0200_0001).unwrap(), 0xDDAA_BBCC);
        assert_eq!(memory.read_word(0x0200_0002).unwrap(), 0xCCDD_AABB);
        assert_eq!(memory.read_word(0x0200_0003).unwrap(), 0xBBCC_DDAA);
    }

    #[test]
    fn test_unaligned_writes_are_forced_down() {
        let mut memory = InternalMemory::default();
        memory.write_word(0x0200_0006, 0x1122_3344).unwrap();
        assert_eq!(memory.read_word(0x0200_0004).unwrap(), 0x1122_3344);

        memory.write_half_word(0x0200_0011, 0xBEEF).unwrap();
        assert_eq!(memory.read_half_word(0x0200_0010).unwrap(), 0xBEEF);
    }

    #[test]
    fn test_rom_is_mirrored_and_read_only() {
        let mut memory = InternalMemory::default();
        memory.load_rom(&[0x05, 0x00, 0xA0, 0xE3]);

        for base in CARTRIDGE_MIRRORS {
            assert_eq!(memory.read_word(base).unwrap(), 0xE3A0_0005);
            assert_eq!(
                memory.write_word(base, 0),
                Err(MemoryError::ReadOnlyViolation { address: base })
            );
        }
        assert_eq!(
            memory.write_at(0x0A00_0002, 0xFF),
            Err(MemoryError::ReadOnlyViolation { address: 0x0A00_0002 })
        );
        assert_eq!(memory.read_word(0x0800_0000).unwrap(), 0xE3A0_0005);
    }

    #[test]
    fn test_rom_window_follows_image_length() {
        let mut memory = InternalMemory::default();
        assert_eq!(
            memory.read_at(0x0800_0000),
            Err(MemoryError::UnmappedAccess { address: 0x0800_0000 })
        );

        memory.load_rom(&[1, 2, 3, 4]);
        assert_eq!(memory.read_at(0x0800_0003).unwrap(), 4);
        assert_eq!(
            memory.read_at(0x0800_0004),
            Err(MemoryError::UnmappedAccess { address: 0x0800_0004 })
        );
    }

    #[test]
    fn test_unmapped_access() {
        let mut memory = InternalMemory::default();

        for address in [0x0000_4000, 0x0100_0000, 0x0204_0000, 0x0400_03FF, 0x1000_0000] {
            assert_eq!(
                memory.read_at(address),
                Err(MemoryError::UnmappedAccess { address })
            );
        }
        assert_eq!(
            memory.write_word(0x0300_8000, 1),
            Err(MemoryError::UnmappedAccess { address: 0x0300_8000 })
        );
    }

    #[test]
    fn test_faulting_write_stores_nothing() {
        let mut memory = InternalMemory::default();

        // The I/O window ends at 0x040003FE, so the last byte is unmapped.
        assert_eq!(
            memory.write_word(0x0400_03FC, 0xAABB_CCDD),
            Err(MemoryError::UnmappedAccess { address: 0x0400_03FF })
        );
        for address in 0x0400_03FC..=0x0400_03FE {
            assert_eq!(memory.read_at(address).unwrap(), 0);
        }

        assert_eq!(memory.write_half_word(0x0300_7FFF, 0xBEEF), Ok(()));
        assert_eq!(memory.read_half_word(0x0300_7FFE).unwrap(), 0xBEEF);
    }

    #[test]
    fn test_object_attributes_window() {
        let mut memory = InternalMemory::default();
        memory.write_half_word(0x0700_03FE, 0x1234).unwrap();

        assert_eq!(memory.locate(0x0700_03FE).unwrap(), (Region::ObjectAttributes, 0x3FE));
        assert_eq!(memory.read_half_word(0x0700_03FE).unwrap(), 0x1234);
    }
}
