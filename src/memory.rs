//! Pages, frames and the mapping between them.
//!
//! [`MemoryModel`] holds the authoritative state and exposes only primitive
//! mutations. It does not decide anything: hit/fault classification and
//! victim selection belong to the driver and the policy engine.

use serde::Serialize;

pub type PageId = usize;
pub type FrameId = usize;

/// A unit of virtual address space.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Page {
    pub id: PageId,
    pub frame_id: Option<FrameId>,
    /// Step of the most recent access.
    pub last_accessed: usize,
    /// Step at which the page was last brought into a frame.
    pub loaded_at: usize,
    pub reference_count: usize,
}

impl Page {
    fn new(id: PageId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.frame_id.is_some()
    }
}

/// A unit of physical memory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Frame {
    pub id: FrameId,
    pub page_id: Option<PageId>,
    pub dirty: bool,
    /// Accesses while the current page is resident, the loading one included.
    pub access_count: usize,
}

impl Frame {
    fn new(id: FrameId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.page_id.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryModel {
    pages: Vec<Page>,
    frames: Vec<Frame>,
}

impl MemoryModel {
    pub fn new(page_count: usize, frame_count: usize) -> Self {
        let mut model = Self {
            pages: Vec::with_capacity(page_count),
            frames: Vec::with_capacity(frame_count),
        };
        model.reset(page_count, frame_count);
        model
    }

    /// Every page unloaded with zeroed counters, every frame free.
    pub fn reset(&mut self, page_count: usize, frame_count: usize) {
        self.pages.clear();
        self.pages.extend((0..page_count).map(Page::new));
        self.frames.clear();
        self.frames.extend((0..frame_count).map(Frame::new));
    }

    pub fn is_resident(&self, page: PageId) -> bool {
        self.pages[page].is_loaded()
    }

    /// Lowest-id free frame.
    pub fn find_free_frame(&self) -> Option<FrameId> {
        self.frames
            .iter()
            .find(|frame| !frame.is_occupied())
            .map(|frame| frame.id)
    }

    /// Brings `page` into `frame`.
    ///
    /// The page must be unloaded and the frame must either be free or hold a
    /// page that was already released with [`unload_page`](Self::unload_page).
    pub fn load_page(&mut self, page: PageId, frame: FrameId, step: usize) {
        debug_assert!(!self.pages[page].is_loaded(), "page {page} already resident");
        debug_assert!(
            self.frames[frame]
                .page_id
                .map_or(true, |old| !self.pages[old].is_loaded()),
            "frame {frame} still owned by a resident page"
        );

        let entry = &mut self.pages[page];
        entry.frame_id = Some(frame);
        entry.last_accessed = step;
        entry.loaded_at = step;
        entry.reference_count += 1;

        let slot = &mut self.frames[frame];
        slot.page_id = Some(page);
        slot.dirty = false;
        slot.access_count = 1;
    }

    /// Marks `page` unloaded and returns the frame it occupied. The frame
    /// itself is left untouched for the caller to refill.
    pub fn unload_page(&mut self, page: PageId) -> Option<FrameId> {
        self.pages[page].frame_id.take()
    }

    /// Records a hit on a resident page.
    pub fn touch_page(&mut self, page: PageId, step: usize) {
        let entry = &mut self.pages[page];
        entry.last_accessed = step;
        entry.reference_count += 1;
        if let Some(frame) = entry.frame_id {
            self.frames[frame].access_count += 1;
        }
    }

    /// Sets the modified bit of the frame holding `page`.
    pub fn mark_dirty(&mut self, page: PageId) {
        if let Some(frame) = self.pages[page].frame_id {
            self.frames[frame].dirty = true;
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn page(&self, id: PageId) -> &Page {
        &self.pages[id]
    }

    pub fn frame(&self, id: FrameId) -> &Frame {
        &self.frames[id]
    }

    /// Occupied frames paired with their resident page, in frame order.
    pub fn resident_pages(&self) -> impl Iterator<Item = (&Frame, &Page)> {
        self.frames.iter().filter_map(|frame| {
            frame
                .page_id
                .map(|page| (frame, &self.pages[page]))
                .filter(|(_, page)| page.frame_id == Some(frame.id))
        })
    }

    /// True when loaded pages and occupied frames point at each other one to
    /// one.
    pub fn is_consistent(&self) -> bool {
        let pages_ok = self.pages.iter().all(|page| match page.frame_id {
            Some(frame) => self.frames[frame].page_id == Some(page.id),
            None => self
                .frames
                .iter()
                .all(|frame| frame.page_id != Some(page.id)),
        });
        let frames_ok = self.frames.iter().all(|frame| match frame.page_id {
            Some(page) => self.pages[page].frame_id == Some(frame.id),
            None => true,
        });
        pages_ok && frames_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_allocates_free_state() {
        let model = MemoryModel::new(4, 2);
        assert_eq!(model.pages().len(), 4);
        assert_eq!(model.frames().len(), 2);
        assert!(model.pages().iter().all(|p| !p.is_loaded()));
        assert!(model.frames().iter().all(|f| !f.is_occupied()));
        assert_eq!(model.find_free_frame(), Some(0));
    }

    #[test]
    fn load_touch_and_reload() {
        let mut model = MemoryModel::new(4, 2);
        model.load_page(2, 0, 0);
        assert!(model.is_resident(2));
        assert_eq!(model.find_free_frame(), Some(1));

        model.touch_page(2, 3);
        model.mark_dirty(2);
        assert_eq!(model.page(2).last_accessed, 3);
        assert_eq!(model.page(2).loaded_at, 0);
        assert_eq!(model.page(2).reference_count, 2);
        assert_eq!(model.frame(0).access_count, 2);
        assert!(model.frame(0).dirty);

        assert_eq!(model.unload_page(2), Some(0));
        assert!(!model.is_resident(2));
        assert_eq!(model.frame(0).page_id, Some(2));
        assert!(!model.is_consistent());
        assert_eq!(model.resident_pages().count(), 0);

        model.load_page(3, 0, 4);
        assert!(model.is_consistent());
        assert!(!model.frame(0).dirty);
        assert_eq!(model.frame(0).access_count, 1);
        // reference counts survive eviction
        assert_eq!(model.page(2).reference_count, 2);
    }
}
