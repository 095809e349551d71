// Copyright (c) 2021 RBB S.r.l
// opensource@mintlayer.org
// SPDX-License-Identifier: MIT
// Licensed under the MIT License;
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// 	http://spdx.org/licenses/MIT
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::error::Error;
use crate::num::ScriptNum;

type Result<T> = std::result::Result<T, Error>;

/// The execution stack: byte vectors, top at the end. All accessors report
/// underflow as [`Error::InvalidStackOperation`] so opcode handlers can use
/// `?` directly.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Stack {
    data: Vec<Vec<u8>>,
    require_minimal: bool,
}

impl Stack {
    pub fn new(require_minimal: bool) -> Self {
        Stack {
            data: Vec::new(),
            require_minimal,
        }
    }

    pub fn from_data(data: Vec<Vec<u8>>, require_minimal: bool) -> Self {
        Stack {
            data,
            require_minimal,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Vec<u8>> {
        self.data.iter()
    }

    pub fn into_data(self) -> Vec<Vec<u8>> {
        self.data
    }

    pub fn truncate(&mut self, len: usize) {
        self.data.truncate(len);
    }

    fn require(&self, len: usize) -> Result<()> {
        if self.data.len() < len {
            return Err(Error::InvalidStackOperation);
        }
        Ok(())
    }

    pub fn push(&mut self, value: Vec<u8>) {
        self.data.push(value);
    }

    pub fn push_num(&mut self, num: impl Into<ScriptNum>) {
        self.push(num.into().to_bytes());
    }

    pub fn push_bool(&mut self, value: bool) {
        self.push(if value { vec![1] } else { vec![] });
    }

    pub fn pop(&mut self) -> Result<Vec<u8>> {
        self.data.pop().ok_or(Error::InvalidStackOperation)
    }

    pub fn pop_num(&mut self) -> Result<ScriptNum> {
        self.pop_num_with_max_size(ScriptNum::MAX_NUM_SIZE)
    }

    pub fn pop_num_with_max_size(&mut self, max_size: usize) -> Result<ScriptNum> {
        let bytes = self.pop()?;
        ScriptNum::from_bytes(&bytes, self.require_minimal, Some(max_size)).map_err(Into::into)
    }

    pub fn pop_bool(&mut self) -> Result<bool> {
        Ok(cast_to_bool(&self.pop()?))
    }

    pub fn last(&self) -> Result<&Vec<u8>> {
        self.data.last().ok_or(Error::InvalidStackOperation)
    }

    pub fn peek_bool(&self) -> Result<bool> {
        Ok(cast_to_bool(self.last()?))
    }

    /// The element `i` positions below the top; `top(0)` is the top itself.
    pub fn top(&self, i: usize) -> Result<&Vec<u8>> {
        self.require(i + 1)?;
        Ok(&self.data[self.data.len() - i - 1])
    }

    /// Removes the element `i` positions below the top and returns it.
    pub fn remove(&mut self, i: usize) -> Result<Vec<u8>> {
        self.require(i + 1)?;
        let index = self.data.len() - i - 1;
        Ok(self.data.remove(index))
    }

    /// Drops the top `n` elements.
    pub fn drop_top(&mut self, n: usize) -> Result<()> {
        self.require(n)?;
        self.data.truncate(self.data.len() - n);
        Ok(())
    }

    /// Duplicates the top `n` elements in place:
    /// `dup(2)` turns `[.. a b]` into `[.. a b a b]`.
    pub fn dup(&mut self, n: usize) -> Result<()> {
        self.require(n)?;
        let len = self.data.len();
        self.data.extend_from_within(len - n..);
        Ok(())
    }

    /// Copies the `n` elements that sit below the top `n` to the top:
    /// `over(1)` turns `[.. a b]` into `[.. a b a]`.
    pub fn over(&mut self, n: usize) -> Result<()> {
        self.require(n * 2)?;
        let len = self.data.len();
        self.data.extend_from_within(len - 2 * n..len - n);
        Ok(())
    }

    /// Rotates the top `3n` elements left by `n`:
    /// `rot(1)` turns `[a b c]` into `[b c a]`.
    pub fn rot(&mut self, n: usize) -> Result<()> {
        self.require(n * 3)?;
        let len = self.data.len();
        self.data[len - 3 * n..].rotate_left(n);
        Ok(())
    }

    /// Swaps the top `n` elements with the `n` below them:
    /// `swap(2)` turns `[a b c d]` into `[c d a b]`.
    pub fn swap(&mut self, n: usize) -> Result<()> {
        self.require(n * 2)?;
        let len = self.data.len();
        self.data[len - 2 * n..].rotate_left(n);
        Ok(())
    }

    /// Removes the second-from-top element: `[a b c]` becomes `[a c]`.
    pub fn nip(&mut self) -> Result<()> {
        self.remove(1).map(|_| ())
    }

    /// Inserts a copy of the top element below the second-from-top:
    /// `[a b]` becomes `[b a b]`.
    pub fn tuck(&mut self) -> Result<()> {
        self.require(2)?;
        let top = self.last().expect("length checked above").clone();
        let len = self.data.len();
        self.data.insert(len - 2, top);
        Ok(())
    }
}

/// The boolean interpretation of a stack element: false iff every byte is
/// zero, where the top byte may also be 0x80 (negative zero).
pub fn cast_to_bool(data: &[u8]) -> bool {
    match data.split_last() {
        None => false,
        Some((&last, rest)) => rest.iter().any(|&b| b != 0) || (last != 0 && last != 0x80),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn stack_of(items: &[&[u8]]) -> Stack {
        Stack::from_data(items.iter().map(|i| i.to_vec()).collect(), false)
    }

    #[rstest]
    #[case(&[], false)]
    #[case(&[0x00], false)]
    #[case(&[0x80], false)]
    #[case(&[0x00, 0x00], false)]
    #[case(&[0x00, 0x80], false)]
    #[case(&[0x01], true)]
    #[case(&[0x01, 0x00], true)]
    #[case(&[0x00, 0x01], true)]
    #[case(&[0x80, 0x00], true)]
    fn boolean_casting(#[case] data: &[u8], #[case] expected: bool) {
        assert_eq!(cast_to_bool(data), expected);
    }

    #[test]
    fn underflow_reporting() {
        let mut stack = Stack::new(false);
        assert_eq!(stack.pop(), Err(Error::InvalidStackOperation));
        assert_eq!(stack.last(), Err(Error::InvalidStackOperation));
        assert_eq!(stack.top(0), Err(Error::InvalidStackOperation));
        assert_eq!(stack.dup(1), Err(Error::InvalidStackOperation));
        assert_eq!(stack.nip(), Err(Error::InvalidStackOperation));
    }

    #[test]
    fn dup_over_rot_swap_tuck() {
        let mut stack = stack_of(&[&[1], &[2], &[3]]);
        stack.dup(1).unwrap();
        assert_eq!(stack.clone().into_data(), vec![vec![1], vec![2], vec![3], vec![3]]);

        let mut stack = stack_of(&[&[1], &[2]]);
        stack.over(1).unwrap();
        assert_eq!(stack.clone().into_data(), vec![vec![1], vec![2], vec![1]]);

        let mut stack = stack_of(&[&[1], &[2], &[3]]);
        stack.rot(1).unwrap();
        assert_eq!(stack.clone().into_data(), vec![vec![2], vec![3], vec![1]]);

        let mut stack = stack_of(&[&[1], &[2], &[3], &[4]]);
        stack.swap(2).unwrap();
        assert_eq!(
            stack.clone().into_data(),
            vec![vec![3], vec![4], vec![1], vec![2]]
        );

        let mut stack = stack_of(&[&[1], &[2]]);
        stack.tuck().unwrap();
        assert_eq!(stack.into_data(), vec![vec![2], vec![1], vec![2]]);
    }

    #[test]
    fn remove_and_top_index_from_top() {
        let mut stack = stack_of(&[&[1], &[2], &[3]]);
        assert_eq!(stack.top(0), Ok(&vec![3]));
        assert_eq!(stack.top(2), Ok(&vec![1]));
        assert_eq!(stack.remove(1), Ok(vec![2]));
        assert_eq!(stack.into_data(), vec![vec![1], vec![3]]);
    }

    #[test]
    fn pop_num_respects_minimality_flag() {
        let mut strict = Stack::from_data(vec![vec![0x01, 0x00]], true);
        assert_eq!(strict.pop_num(), Err(Error::MinimalData));

        let mut lax = Stack::from_data(vec![vec![0x01, 0x00]], false);
        assert_eq!(lax.pop_num().unwrap().value(), 1);
    }
}
